use dusted::model::NewTask;
use dusted::store::Store;
use uuid::Uuid;

struct Fixture {
    store: Store,
    task: Uuid,
    a: Uuid,
    a1: Uuid,
    a2: Uuid,
    b: Uuid,
}

// Plan trip
//   a: Flights
//     a1: Compare prices
//     a2: Book seats
//   b: Hotel
fn fixture() -> Fixture {
    let mut store = Store::in_memory("My Tasks");
    let list = store.active_list_id().unwrap();
    let task = store.add_task(list, NewTask::plain("Plan trip")).unwrap();
    let a = store.add_subtask(task, &[], "Flights").unwrap();
    let a1 = store.add_subtask(task, &[a], "Compare prices").unwrap();
    let a2 = store.add_subtask(task, &[a], "Book seats").unwrap();
    let b = store.add_subtask(task, &[], "Hotel").unwrap();
    Fixture {
        store,
        task,
        a,
        a1,
        a2,
        b,
    }
}

fn done(f: &Fixture, path: &[Uuid]) -> bool {
    let task = f.store.find_task(f.task).unwrap();
    if path.is_empty() {
        task.completed
    } else {
        task.subtask(path).unwrap().completed
    }
}

#[test]
fn toggling_parent_sets_every_descendant() {
    let mut f = fixture();
    assert!(f.store.toggle_task(f.task));
    for path in [vec![f.a], vec![f.a, f.a1], vec![f.a, f.a2], vec![f.b]] {
        assert!(done(&f, &path));
    }
    assert!(f.store.toggle_task(f.task));
    for path in [vec![f.a], vec![f.a, f.a1], vec![f.a, f.a2], vec![f.b]] {
        assert!(!done(&f, &path));
    }
}

#[test]
fn toggling_middle_node_sets_its_subtree_only() {
    let mut f = fixture();
    assert!(f.store.toggle_subtask(f.task, &[f.a]));
    assert!(done(&f, &[f.a, f.a1]));
    assert!(done(&f, &[f.a, f.a2]));
    assert!(!done(&f, &[f.b]));
    assert!(!done(&f, &[]));
}

#[test]
fn completing_all_children_completes_the_task() {
    let mut f = fixture();
    let (task, a, a1, a2, b) = (f.task, f.a, f.a1, f.a2, f.b);
    f.store.toggle_subtask(task, &[a, a1]);
    assert!(!done(&f, &[a]));
    f.store.toggle_subtask(task, &[a, a2]);
    assert!(done(&f, &[a]));
    assert!(!done(&f, &[]));
    f.store.toggle_subtask(task, &[b]);
    assert!(done(&f, &[]));

    // Uncompleting any single leaf reopens every ancestor.
    f.store.toggle_subtask(task, &[a, a2]);
    assert!(!done(&f, &[a]));
    assert!(!done(&f, &[]));
}

#[test]
fn reordering_preserves_membership() {
    let mut store = Store::in_memory("My Tasks");
    let list = store.active_list_id().unwrap();
    let ids: Vec<Uuid> = ["one", "two", "three", "four", "five"]
        .iter()
        .map(|t| store.add_task(list, NewTask::plain(t)).unwrap())
        .collect();

    store.move_task(list, ids[4], ids[0]);
    store.move_task(list, ids[1], ids[3]);
    store.move_task_by(ids[2], -2);

    let mut after: Vec<Uuid> = store.list(list).unwrap().tasks.iter().map(|t| t.id).collect();
    assert_eq!(after.len(), ids.len());
    after.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(after, expected);
}
