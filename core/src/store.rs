//! In-memory record store.
//!
//! # Design
//! Each record kind lives in its own `Table`: an ordered map from id to
//! record plus the last id handed out. Ids grow monotonically and are never
//! reused, so iterating the map in key order is also insertion order.
//!
//! The store has no locking of its own. Mutation requires `&mut`, which
//! leaves the choice of synchronization to whoever owns it.

use std::collections::BTreeMap;

use crate::types::{Todo, TodoId, User, UserId};

/// A record that can be kept in a `Table`.
pub trait Record: Clone {
    fn id(&self) -> u64;
}

impl Record for Todo {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for User {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Records of one kind plus their id counter.
#[derive(Debug, Clone)]
pub struct Table<T> {
    records: BTreeMap<u64, T>,
    last_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Record> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues an id strictly greater than every id issued before.
    pub fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.records.get(&id)
    }

    /// Inserts `record`, replacing any record stored under the same id.
    pub fn put(&mut self, record: T) {
        self.records.insert(record.id(), record);
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.records.remove(&id).is_some()
    }

    /// Removes every record matching `predicate` and returns how many went.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !predicate(record));
        before - self.records.len()
    }

    /// Snapshot of every stored record in ascending id order.
    pub fn all(&self) -> Vec<T> {
        self.records.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Every table the service works with.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    todos: Table<Todo>,
    users: Table<User>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_todo_id(&mut self) -> TodoId {
        self.todos.next_id()
    }

    pub fn next_user_id(&mut self) -> UserId {
        self.users.next_id()
    }

    pub fn todos(&self) -> &Table<Todo> {
        &self.todos
    }

    pub fn todos_mut(&mut self) -> &mut Table<Todo> {
        &mut self.todos
    }

    pub fn users(&self) -> &Table<User> {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut Table<User> {
        &mut self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut table: Table<User> = Table::new();
        assert_eq!(table.next_id(), 1);
        assert_eq!(table.next_id(), 2);
        assert_eq!(table.next_id(), 3);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut table = Table::new();
        let id = table.next_id();
        table.put(user(id, "ann"));
        assert!(table.remove(id));
        assert_eq!(table.next_id(), 2);
    }

    #[test]
    fn put_then_get() {
        let mut table = Table::new();
        let id = table.next_id();
        table.put(user(id, "ann"));
        assert_eq!(table.get(id).map(|u| u.username.as_str()), Some("ann"));
        assert!(table.get(99).is_none());
    }

    #[test]
    fn put_overwrites_existing_record() {
        let mut table = Table::new();
        table.put(user(1, "ann"));
        table.put(user(1, "bob"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().username, "bob");
    }

    #[test]
    fn remove_reports_whether_anything_was_removed() {
        let mut table = Table::new();
        table.put(user(1, "ann"));
        assert!(table.remove(1));
        assert!(!table.remove(1));
        assert!(table.is_empty());
    }

    #[test]
    fn all_returns_records_in_id_order() {
        let mut table = Table::new();
        table.put(user(3, "c"));
        table.put(user(1, "a"));
        table.put(user(2, "b"));
        let names: Vec<String> = table.all().into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn remove_where_counts_removed_records() {
        let mut table = Table::new();
        for (id, name) in [(1, "keep"), (2, "drop"), (3, "drop"), (4, "keep")] {
            table.put(user(id, name));
        }
        assert_eq!(table.remove_where(|u| u.username == "drop"), 2);
        assert_eq!(table.len(), 2);
        assert!(table.get(2).is_none());
        assert!(table.get(4).is_some());
    }

    #[test]
    fn todo_and_user_counters_are_independent() {
        let mut store = RecordStore::new();
        assert_eq!(store.next_todo_id(), 1);
        assert_eq!(store.next_todo_id(), 2);
        assert_eq!(store.next_user_id(), 1);
    }
}
