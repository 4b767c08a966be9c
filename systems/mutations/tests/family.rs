use mapforge_core::{
    GameObject, Infantry, ObjectId, ObjectKind, ObjectRef, PlacementError, Point2D, Structure,
    SubCell, Techno, TechnoAttributes, TechnoHandle, TerrainObject, Unit,
};
use mapforge_system_mutations::{
    ChangeTileMutation, DeleteObjectMutation, MoveTechnoMutation, Mutation, MutationError,
    MutationState, PlaceTechnoMutation, TileSelection,
};
use mapforge_world::{query, Cell, EditorSession, MutationTarget};

fn attributes(type_name: &str) -> TechnoAttributes {
    TechnoAttributes::new(type_name, "Nod")
}

fn cells(session: &EditorSession) -> Vec<Cell> {
    session.map().cells().cloned().collect()
}

fn rifleman_template() -> Techno {
    Infantry::new(ObjectId::new(0), Point2D::new(0, 0), attributes("E1"), None).into()
}

#[test]
fn placing_infantry_fills_slots_in_precedence_order() {
    let mut session = EditorSession::new(8, 8);
    let point = Point2D::new(3, 3);
    let mut mutations: Vec<PlaceTechnoMutation> = (0..3)
        .map(|_| PlaceTechnoMutation::new(rifleman_template(), point))
        .collect();

    for mutation in &mut mutations {
        mutation.perform(&mut session).expect("slot available");
    }

    let cell = query::tile(&session, point).expect("in bounds");
    let occupied: Vec<SubCell> = SubCell::ALL
        .into_iter()
        .filter(|slot| cell.infantry_at(*slot).is_some())
        .collect();
    assert_eq!(occupied, vec![SubCell::Bottom, SubCell::Left, SubCell::Right]);

    let mut fourth = PlaceTechnoMutation::new(rifleman_template(), point);
    assert_eq!(
        fourth.perform(&mut session),
        Err(MutationError::Placement(PlacementError::NoFreeSubCell(point)))
    );

    for mutation in mutations.iter_mut().rev() {
        mutation.undo(&mut session).expect("undo");
    }
    assert!(query::tile(&session, point).is_some_and(|cell| !cell.has_techno()));
}

#[test]
fn place_undo_redo_keeps_identity() {
    let mut session = EditorSession::new(8, 8);
    let template = Techno::from(Unit::new(
        ObjectId::new(0),
        Point2D::new(0, 0),
        attributes("BGGY"),
    ));
    let mut mutation = PlaceTechnoMutation::new(template, Point2D::new(6, 1));
    assert_eq!(mutation.display_name(), "Place BGGY at (6, 1)");

    mutation.perform(&mut session).expect("perform");
    let placed = mutation.placed().expect("placed");
    mutation.undo(&mut session).expect("undo");
    assert!(session.map().find_techno(placed.id).is_none());

    mutation.perform(&mut session).expect("redo");
    assert_eq!(mutation.placed(), Some(placed));
    assert!(session.map().find_techno(placed.id).is_some());
}

#[test]
fn delete_then_undo_restores_exact_slot_and_identity() {
    let mut session = EditorSession::new(8, 8);
    let point = Point2D::new(2, 5);
    session
        .map_mut()
        .place_infantry(Infantry::new(
            ObjectId::new(40),
            point,
            attributes("E3"),
            Some(SubCell::Right),
        ))
        .expect("infantry");
    let before = cells(&session);

    let cell = query::tile(&session, point).expect("in bounds");
    let mut mutation =
        DeleteObjectMutation::new(cell, ObjectRef::new(ObjectId::new(40), ObjectKind::Infantry))
            .expect("infantry present");

    mutation.perform(&mut session).expect("delete");
    assert!(query::tile(&session, point).is_some_and(|cell| !cell.has_techno()));
    assert_eq!(mutation.display_name(), "Delete E3 at (2, 5)");

    mutation.undo(&mut session).expect("restore");
    assert_eq!(cells(&session), before);
}

#[test]
fn delete_rejects_decorations_and_missing_objects() {
    let mut session = EditorSession::new(4, 4);
    let point = Point2D::new(1, 1);
    session
        .map_mut()
        .place_terrain_object(TerrainObject::new(ObjectId::new(1), point, "TREE01"))
        .expect("terrain");

    let cell = query::tile(&session, point).expect("in bounds");
    assert_eq!(
        DeleteObjectMutation::new(cell, ObjectRef::new(ObjectId::new(1), ObjectKind::Terrain))
            .map(|_| ()),
        Err(MutationError::UnsupportedObject {
            kind: ObjectKind::Terrain
        })
    );
    assert_eq!(
        DeleteObjectMutation::new(cell, ObjectRef::new(ObjectId::new(2), ObjectKind::Unit))
            .map(|_| ()),
        Err(MutationError::MissingObject {
            kind: ObjectKind::Unit,
            position: point,
        })
    );

    let mut stale = DeleteObjectMutation::from_handle(TechnoHandle::new(
        ObjectKind::Unit,
        ObjectId::new(2),
        point,
    ));
    assert!(matches!(
        stale.perform(&mut session),
        Err(MutationError::MissingObject { .. })
    ));
    assert_eq!(stale.state(), MutationState::Created);
}

#[test]
fn move_and_undo_round_trip() {
    let mut session = EditorSession::new(8, 8);
    let origin = Point2D::new(1, 1);
    let destination = Point2D::new(6, 6);
    session
        .map_mut()
        .place_building(Structure::new(ObjectId::new(9), origin, attributes("NAHAND")))
        .expect("structure");
    let before = cells(&session);

    let handle = TechnoHandle::new(ObjectKind::Building, ObjectId::new(9), origin);
    let mut mutation = MoveTechnoMutation::new(handle, destination);
    mutation.perform(&mut session).expect("destination is free");

    assert!(query::tile(&session, origin).is_some_and(|cell| cell.structure().is_none()));
    assert_eq!(
        query::tile(&session, destination)
            .and_then(Cell::structure)
            .map(|structure| (structure.id(), structure.position())),
        Some((ObjectId::new(9), destination))
    );

    mutation.undo(&mut session).expect("undo");
    assert_eq!(cells(&session), before);
}

#[test]
fn failed_move_leaves_object_in_place() {
    let mut session = EditorSession::new(8, 8);
    let origin = Point2D::new(0, 0);
    let destination = Point2D::new(1, 0);
    session
        .map_mut()
        .place_unit(Unit::new(ObjectId::new(1), origin, attributes("BGGY")))
        .expect("mover");
    session
        .map_mut()
        .place_unit(Unit::new(ObjectId::new(2), destination, attributes("BGGY")))
        .expect("blocker");
    let mover = ObjectRef::new(ObjectId::new(1), ObjectKind::Unit);
    session.map_mut().add_overlap(Point2D::new(0, 1), mover);
    let before = cells(&session);

    let mut mutation = MoveTechnoMutation::new(
        TechnoHandle::new(ObjectKind::Unit, ObjectId::new(1), origin),
        destination,
    );
    assert_eq!(
        mutation.perform(&mut session),
        Err(MutationError::Placement(PlacementError::Occupied {
            kind: ObjectKind::Unit,
            position: destination,
        }))
    );
    assert_eq!(cells(&session), before, "overlap entries must survive a rejected move");
    assert_eq!(mutation.state(), MutationState::Created);
}

#[test]
fn delete_and_undo_restore_overlap_entries_in_order() {
    let mut session = EditorSession::new(6, 6);
    let point = Point2D::new(2, 2);
    let shadow = Point2D::new(2, 1);
    session
        .map_mut()
        .place_building(Structure::new(ObjectId::new(5), point, attributes("NAHAND")))
        .expect("structure");
    let hand = ObjectRef::new(ObjectId::new(5), ObjectKind::Building);
    let tree = ObjectRef::new(ObjectId::new(6), ObjectKind::Terrain);
    session.map_mut().add_overlap(shadow, tree);
    session.map_mut().add_overlap(shadow, hand);
    session.map_mut().add_overlap(Point2D::new(3, 1), hand);
    let before = cells(&session);

    let cell = query::tile(&session, point).expect("in bounds");
    let mut mutation = DeleteObjectMutation::new(cell, hand).expect("structure present");
    for _ in 0..2 {
        mutation.perform(&mut session).expect("delete");
        assert_eq!(
            query::tile(&session, shadow).map(Cell::overlap_list),
            Some(&[tree][..])
        );
        mutation.undo(&mut session).expect("restore");
        assert_eq!(cells(&session), before);
    }
}

#[test]
fn move_round_trip_keeps_overlap_entries() {
    let mut session = EditorSession::new(8, 8);
    let origin = Point2D::new(1, 1);
    session
        .map_mut()
        .place_unit(Unit::new(ObjectId::new(3), origin, attributes("MCV")))
        .expect("unit");
    let unit = ObjectRef::new(ObjectId::new(3), ObjectKind::Unit);
    session.map_mut().add_overlap(Point2D::new(1, 0), unit);
    let before = cells(&session);

    let handle = TechnoHandle::new(ObjectKind::Unit, ObjectId::new(3), origin);
    let mut mutation = MoveTechnoMutation::new(handle, Point2D::new(5, 5));
    mutation.perform(&mut session).expect("move");
    assert!(query::tile(&session, Point2D::new(1, 0))
        .is_some_and(|cell| cell.overlap_list().is_empty()));

    mutation.undo(&mut session).expect("undo");
    assert_eq!(cells(&session), before);
}

#[test]
fn tile_painting_is_reversible() {
    let mut session = EditorSession::new(4, 4);
    let before = cells(&session);
    let mut mutation = ChangeTileMutation::new(vec![
        (Point2D::new(0, 0), TileSelection::new(5, 1)),
        (Point2D::new(1, 0), TileSelection::new(6, 0)),
    ]);

    mutation.perform(&mut session).expect("in bounds");
    assert!(query::tile(&session, Point2D::new(0, 0)).is_some_and(|cell| !cell.is_clear_ground()));

    mutation.undo(&mut session).expect("undo");
    assert_eq!(cells(&session), before);
}
