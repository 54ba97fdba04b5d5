use std::sync::{Arc, Barrier};
use std::thread;

use smartcycle_chat::Directory;
use smartcycle_db::Database;

const THREADS: usize = 8;

fn race(handles: Vec<Arc<Database>>) -> Vec<i64> {
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|i| {
            let db = handles[i % handles.len()].clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let dir = Directory::new(&db);
                if i % 2 == 0 {
                    dir.get_or_create_private_room("a@x.com", "b@x.com").unwrap()
                } else {
                    dir.get_or_create_private_room("b@x.com", "a@x.com").unwrap()
                }
            })
        })
        .collect();

    workers.into_iter().map(|w| w.join().unwrap()).collect()
}

#[test]
fn concurrent_private_room_creation_on_one_handle() {
    let db = Arc::new(Database::open_in_memory().unwrap());

    let ids = race(vec![db.clone()]);
    assert!(ids.windows(2).all(|w| w[0] == w[1]));

    let rooms = Directory::new(&db).list_visible_rooms("a@x.com").unwrap();
    assert_eq!(rooms.len(), 1);
}

#[test]
fn concurrent_private_room_creation_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    // Open sequentially so migrations run once.
    let first = Arc::new(Database::open(&path).unwrap());
    let second = Arc::new(Database::open(&path).unwrap());

    let ids = race(vec![first.clone(), second]);
    assert!(ids.windows(2).all(|w| w[0] == w[1]));

    let rooms = Directory::new(&first).list_visible_rooms("b@x.com").unwrap();
    assert_eq!(rooms.len(), 1);
}
