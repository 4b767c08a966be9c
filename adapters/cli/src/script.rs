//! Scripted editing sessions.
//!
//! A script is a TOML document with one `[[edit]]` table per step. Each
//! table names its `action` and the parameters the action needs:
//!
//! ```toml
//! [[edit]]
//! action = "place"
//! kind = "Infantry"
//! type_name = "E1"
//! at = { x = 5, y = 5 }
//!
//! [[edit]]
//! action = "clone"
//! kind = "Infantry"
//! from = { x = 5, y = 5 }
//! to = { x = 5, y = 6 }
//!
//! [[edit]]
//! action = "undo"
//! ```

use std::{fs, io, path::Path};

use anyhow::{bail, Context, Result};
use log::{info, trace, warn};
use mapforge_core::{
    Aircraft, Infantry, ObjectId, ObjectKind, ObjectRef, Point2D, Structure, Techno,
    TechnoAttributes, TechnoRef, Unit,
};
use mapforge_system_history::MutationHistory;
use mapforge_system_mutations::{
    ChangeTileMutation, CloneObjectMutation, DeleteObjectMutation, MoveTechnoMutation, Mutation,
    PlaceTechnoMutation, TileSelection,
};
use mapforge_world::{query, Cell, EditorSession};
use serde::Deserialize;

use crate::config::EditorConfig;

const DEFAULT_OWNER: &str = "Neutral";

/// Ordered list of edits read from a script file.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    #[serde(default)]
    edit: Vec<Edit>,
}

/// One step of a script.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Edit {
    Place {
        kind: ObjectKind,
        type_name: String,
        #[serde(default = "default_owner")]
        owner: String,
        at: Point2D,
    },
    Clone {
        kind: ObjectKind,
        from: Point2D,
        to: Point2D,
    },
    Move {
        kind: ObjectKind,
        from: Point2D,
        to: Point2D,
    },
    Delete {
        kind: ObjectKind,
        at: Point2D,
    },
    Tile {
        at: Point2D,
        tile: u32,
        #[serde(default)]
        sub_tile: u8,
    },
    Undo,
    Redo,
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_owned()
}

impl Script {
    /// Reads and parses the script at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read edit script at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid edit script at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse edit script toml contents")
    }
}

/// What became of a single edit.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Outcome {
    Applied,
    Rejected(String),
    Nothing,
}

/// Drives an editing session through a script.
#[derive(Debug)]
pub(crate) struct ScriptRunner {
    session: EditorSession,
    history: MutationHistory,
    applied: usize,
    rejected: usize,
    redrawn: usize,
}

impl ScriptRunner {
    /// Creates a runner editing a blank map sized by `config`.
    pub(crate) fn new(config: &EditorConfig) -> Self {
        let mut runner = Self {
            session: EditorSession::new(config.map.width, config.map.height),
            history: MutationHistory::new(config.history.max_depth),
            applied: 0,
            rejected: 0,
            redrawn: 0,
        };
        runner.render();
        runner
    }

    /// Applies every edit of `script` in order.
    ///
    /// Edits the editor would refuse are skipped and counted. A mutation that
    /// fails after passing validation aborts the run.
    pub(crate) fn run(&mut self, script: &Script) -> Result<()> {
        for (index, edit) in script.edit.iter().enumerate() {
            let outcome = self
                .apply(edit)
                .with_context(|| format!("edit #{} ({edit:?}) failed", index + 1))?;
            match outcome {
                Outcome::Applied => self.applied += 1,
                Outcome::Rejected(reason) => {
                    warn!("skipping edit #{}: {reason}", index + 1);
                    self.rejected += 1;
                }
                Outcome::Nothing => info!("edit #{} had nothing to do", index + 1),
            }
            self.render();
        }
        Ok(())
    }

    fn apply(&mut self, edit: &Edit) -> Result<Outcome> {
        let mutation: Box<dyn Mutation> = match edit {
            Edit::Place {
                kind,
                type_name,
                owner,
                at,
            } => {
                let template = template(*kind, type_name, owner)?;
                if let Some(reason) = self.refuse_destination(&template, *at) {
                    return Ok(Outcome::Rejected(reason));
                }
                Box::new(PlaceTechnoMutation::new(template, *at))
            }
            Edit::Clone { kind, from, to } => {
                let Some((cell, source)) = self.locate(*kind, *from) else {
                    return Ok(Outcome::Rejected(format!("no {kind:?} at {from}")));
                };
                let reference = ObjectRef::new(source.id(), source.kind());
                let source = source.to_techno();
                let mutation = CloneObjectMutation::new(cell, reference, *to)?;
                if let Some(reason) = self.refuse_destination(&source, *to) {
                    return Ok(Outcome::Rejected(reason));
                }
                Box::new(mutation)
            }
            Edit::Move { kind, from, to } => {
                let Some((_, techno)) = self.locate(*kind, *from) else {
                    return Ok(Outcome::Rejected(format!("no {kind:?} at {from}")));
                };
                let handle = techno.handle();
                let techno = techno.to_techno();
                if let Some(reason) = self.refuse_destination(&techno, *to) {
                    return Ok(Outcome::Rejected(reason));
                }
                Box::new(MoveTechnoMutation::new(handle, *to))
            }
            Edit::Delete { kind, at } => {
                let Some((cell, techno)) = self.locate(*kind, *at) else {
                    return Ok(Outcome::Rejected(format!("no {kind:?} at {at}")));
                };
                let reference = ObjectRef::new(techno.id(), techno.kind());
                Box::new(DeleteObjectMutation::new(cell, reference)?)
            }
            Edit::Tile { at, tile, sub_tile } => {
                if !self.session.map().contains(*at) {
                    return Ok(Outcome::Rejected(format!("{at} lies outside the map")));
                }
                Box::new(ChangeTileMutation::new(vec![(
                    *at,
                    TileSelection::new(*tile, *sub_tile),
                )]))
            }
            Edit::Undo => {
                return Ok(if self.history.undo(&mut self.session)? {
                    Outcome::Applied
                } else {
                    Outcome::Nothing
                });
            }
            Edit::Redo => {
                return Ok(if self.history.redo(&mut self.session)? {
                    Outcome::Applied
                } else {
                    Outcome::Nothing
                });
            }
        };

        self.history.execute(mutation, &mut self.session)?;
        Ok(Outcome::Applied)
    }

    fn locate(&self, kind: ObjectKind, point: Point2D) -> Option<(&Cell, TechnoRef<'_>)> {
        let cell = query::tile(&self.session, point)?;
        let techno = cell.first_techno_matching(|techno| techno.kind() == kind)?;
        Some((cell, techno))
    }

    /// Mirrors the checks an editor performs before offering a placement.
    fn refuse_destination(&self, techno: &Techno, point: Point2D) -> Option<String> {
        match query::tile(&self.session, point) {
            None => Some(format!("{point} lies outside the map")),
            Some(cell) if !cell.can_add_object(techno) => Some(format!(
                "{} cannot be placed at {point}",
                techno.attributes().type_name
            )),
            Some(_) => None,
        }
    }

    /// Redraws every cell the last edits invalidated.
    fn render(&mut self) {
        let frame = self.session.begin_refresh_frame();
        let stale: Vec<Point2D> = self
            .session
            .map()
            .cells()
            .filter(|cell| frame.needs_redraw(cell))
            .map(Cell::position)
            .collect();
        trace!("frame {} redraws {} cells", frame.generation(), stale.len());
        self.redrawn += stale.len();
        for point in stale {
            self.session.mark_drawn(&frame, point);
        }
    }

    /// Writes a human-readable report of the session to `out`.
    pub(crate) fn write_summary(&self, out: &mut impl io::Write) -> io::Result<()> {
        let map = self.session.map();
        writeln!(out, "map: {}x{}", map.width(), map.height())?;
        writeln!(out, "edits: {} applied, {} rejected", self.applied, self.rejected)?;
        for kind in [
            ObjectKind::Aircraft,
            ObjectKind::Building,
            ObjectKind::Unit,
            ObjectKind::Infantry,
        ] {
            writeln!(out, "{kind:?}: {}", map.count_technos(kind))?;
        }
        writeln!(out, "cells redrawn: {}", self.redrawn)?;
        writeln!(out, "undo ({}):", self.history.undo_len())?;
        for name in self.history.undo_names() {
            writeln!(out, "  {name}")?;
        }
        writeln!(out, "redo ({}):", self.history.redo_len())?;
        for name in self.history.redo_names() {
            writeln!(out, "  {name}")?;
        }
        Ok(())
    }
}

fn template(kind: ObjectKind, type_name: &str, owner: &str) -> Result<Techno> {
    let id = ObjectId::new(0);
    let origin = Point2D::default();
    let attributes = TechnoAttributes::new(type_name, owner);
    Ok(match kind {
        ObjectKind::Aircraft => Aircraft::new(id, origin, attributes).into(),
        ObjectKind::Building => Structure::new(id, origin, attributes).into(),
        ObjectKind::Unit => Unit::new(id, origin, attributes).into(),
        ObjectKind::Infantry => Infantry::new(id, origin, attributes, None).into(),
        other => bail!("{other:?} objects cannot be placed by scripts"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_core::SubCell;

    fn runner() -> ScriptRunner {
        ScriptRunner::new(&EditorConfig::default())
    }

    fn run(source: &str) -> ScriptRunner {
        let script = Script::parse(source).expect("script parses");
        let mut runner = runner();
        runner.run(&script).expect("script runs");
        runner
    }

    #[test]
    fn parses_every_action() {
        let script = Script::parse(
            r#"
            [[edit]]
            action = "place"
            kind = "Unit"
            type_name = "MCV"
            at = { x = 1, y = 2 }

            [[edit]]
            action = "tile"
            at = { x = 0, y = 0 }
            tile = 4

            [[edit]]
            action = "undo"
            "#,
        )
        .expect("valid script");

        assert_eq!(
            script.edit,
            vec![
                Edit::Place {
                    kind: ObjectKind::Unit,
                    type_name: "MCV".to_owned(),
                    owner: DEFAULT_OWNER.to_owned(),
                    at: Point2D::new(1, 2),
                },
                Edit::Tile {
                    at: Point2D::new(0, 0),
                    tile: 4,
                    sub_tile: 0,
                },
                Edit::Undo,
            ]
        );
    }

    #[test]
    fn unknown_action_is_an_error() {
        assert!(Script::parse("[[edit]]\naction = \"explode\"\n").is_err());
    }

    #[test]
    fn clone_places_infantry_in_bottom_slot() {
        let runner = run(
            r#"
            [[edit]]
            action = "place"
            kind = "Infantry"
            type_name = "E1"
            at = { x = 5, y = 5 }

            [[edit]]
            action = "clone"
            kind = "Infantry"
            from = { x = 5, y = 5 }
            to = { x = 5, y = 6 }
            "#,
        );

        let cell = query::tile(&runner.session, Point2D::new(5, 6)).expect("in bounds");
        assert!(cell.infantry_at(SubCell::Bottom).is_some());
        assert_eq!(runner.applied, 2);
        assert_eq!(runner.history.undo_len(), 2);
    }

    #[test]
    fn occupied_destination_is_skipped_not_executed() {
        let runner = run(
            r#"
            [[edit]]
            action = "place"
            kind = "Building"
            type_name = "GAPOWR"
            at = { x = 1, y = 1 }

            [[edit]]
            action = "place"
            kind = "Building"
            type_name = "GAWEAP"
            at = { x = 2, y = 2 }

            [[edit]]
            action = "clone"
            kind = "Building"
            from = { x = 1, y = 1 }
            to = { x = 2, y = 2 }
            "#,
        );

        assert_eq!(runner.rejected, 1);
        assert_eq!(runner.history.undo_len(), 2);
        let occupant = query::tile(&runner.session, Point2D::new(2, 2))
            .and_then(Cell::structure)
            .map(|structure| structure.attributes().type_name.clone());
        assert_eq!(occupant.as_deref(), Some("GAWEAP"));
    }

    #[test]
    fn undo_and_redo_follow_the_history() {
        let runner = run(
            r#"
            [[edit]]
            action = "place"
            kind = "Aircraft"
            type_name = "ORCA"
            at = { x = 3, y = 3 }

            [[edit]]
            action = "move"
            kind = "Aircraft"
            from = { x = 3, y = 3 }
            to = { x = 4, y = 4 }

            [[edit]]
            action = "undo"

            [[edit]]
            action = "undo"

            [[edit]]
            action = "redo"

            [[edit]]
            action = "redo"

            [[edit]]
            action = "redo"
            "#,
        );

        assert!(query::tile(&runner.session, Point2D::new(4, 4))
            .is_some_and(|cell| cell.aircraft().is_some()));
        assert!(!runner.history.can_redo());
        assert_eq!(runner.applied, 6, "the final redo has nothing to do");
    }

    #[test]
    fn summary_lists_history_most_recent_first() {
        let runner = run(
            r#"
            [[edit]]
            action = "tile"
            at = { x = 0, y = 0 }
            tile = 9

            [[edit]]
            action = "place"
            kind = "Unit"
            type_name = "BGGY"
            at = { x = 2, y = 0 }

            [[edit]]
            action = "delete"
            kind = "Unit"
            at = { x = 2, y = 0 }
            "#,
        );

        let mut out = Vec::new();
        runner.write_summary(&mut out).expect("in-memory write");
        let report = String::from_utf8(out).expect("utf8 report");
        let delete = report.find("Delete BGGY at (2, 0)").expect("delete listed");
        let paint = report.find("Paint tile 9 at (0, 0)").expect("paint listed");
        assert!(delete < paint, "unexpected order in report:\n{report}");
        assert!(report.contains("Unit: 0"));
    }

    #[test]
    fn edits_only_redraw_nearby_cells() {
        let mut runner = ScriptRunner::new(&EditorConfig::default());
        let initial = runner.redrawn;
        assert_eq!(initial, 64 * 64, "the first frame draws the whole map");

        let script = Script::parse("[[edit]]\naction = \"tile\"\nat = { x = 0, y = 0 }\ntile = 2\n")
            .expect("valid script");
        runner.run(&script).expect("script runs");
        assert_eq!(runner.redrawn - initial, 11 * 11);
    }
}
