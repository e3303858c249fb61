//! Todo and user operations layered on the record store.
//!
//! # Design
//! `TodoService` is the single owner of the store and its clock. Reads take
//! `&self` and mutations take `&mut self`, so one instance shared behind a
//! lock gives each operation exclusive access to the id counter and the
//! read-modify-write of `updated_at`.
//!
//! A missing record is an ordinary outcome: lookups and updates return
//! `Option`, deletes return `bool`. Input is expected to have passed
//! `CreateTodo::validate` / `UpdateTodo::validate` already.

use log::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::UserError;
use crate::store::RecordStore;
use crate::types::{CreateTodo, NewUser, Todo, TodoId, UpdateTodo, User, UserId};

pub struct TodoService<C: Clock = SystemClock> {
    store: RecordStore,
    clock: C,
}

impl TodoService<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TodoService<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TodoService<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            store: RecordStore::new(),
            clock,
        }
    }

    /// Stores a new todo with a fresh id and `created_at == updated_at`.
    pub fn create(&mut self, input: CreateTodo) -> Todo {
        let id = self.store.next_todo_id();
        let now = self.clock.now();
        let todo = Todo {
            id,
            title: input.title,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        self.store.todos_mut().put(todo.clone());
        debug!("event=todo_create id={id} completed={}", todo.completed);
        todo
    }

    /// All todos, newest `created_at` first. Equal timestamps keep
    /// insertion order.
    pub fn get_all(&self) -> Vec<Todo> {
        let mut todos = self.store.todos().all();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        todos
    }

    pub fn get_one(&self, id: TodoId) -> Option<Todo> {
        self.store.todos().get(id).cloned()
    }

    /// Applies the fields present in `patch` and refreshes `updated_at`,
    /// even when the patch is empty. Never creates a missing todo.
    pub fn update(&mut self, id: TodoId, patch: UpdateTodo) -> Option<Todo> {
        let mut todo = self.store.todos().get(id)?.clone();

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        // A clock that stepped backwards must not break created_at <= updated_at.
        todo.updated_at = self.clock.now().max(todo.created_at);

        self.store.todos_mut().put(todo.clone());
        debug!("event=todo_update id={id} completed={}", todo.completed);
        Some(todo)
    }

    pub fn delete(&mut self, id: TodoId) -> bool {
        let removed = self.store.todos_mut().remove(id);
        debug!("event=todo_delete id={id} removed={removed}");
        removed
    }

    /// Removes every completed todo in one pass and returns the count.
    pub fn clear_completed(&mut self) -> usize {
        let count = self.store.todos_mut().remove_where(|todo| todo.completed);
        debug!("event=todo_clear_completed count={count}");
        count
    }

    /// Stores a new user. Usernames are unique; a taken name is rejected
    /// before an id is issued.
    pub fn create_user(&mut self, input: NewUser) -> Result<User, UserError> {
        if self.get_user_by_username(&input.username).is_some() {
            return Err(UserError::UsernameTaken(input.username));
        }
        let id = self.store.next_user_id();
        let user = User {
            id,
            username: input.username,
            password: input.password,
        };
        self.store.users_mut().put(user.clone());
        debug!("event=user_create id={id}");
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Option<User> {
        self.store.users().get(id).cloned()
    }

    /// The user whose username matches exactly.
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.store
            .users()
            .iter()
            .find(|user| user.username == username)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    fn service() -> (TodoService<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (TodoService::with_clock(clock.clone()), clock)
    }

    #[test]
    fn create_sets_both_timestamps_to_now() {
        let (mut service, clock) = service();
        clock.advance(Duration::seconds(10));
        let todo = service.create(CreateTodo::new("Buy milk"));
        assert_eq!(todo.id, 1);
        assert!(!todo.completed);
        assert_eq!(todo.created_at, clock.now());
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn create_keeps_explicit_completed() {
        let (mut service, _) = service();
        let todo = service.create(CreateTodo {
            title: "Done already".to_string(),
            completed: true,
        });
        assert!(todo.completed);
        assert_eq!(service.get_one(todo.id), Some(todo));
    }

    #[test]
    fn get_all_ties_keep_insertion_order() {
        let (mut service, _) = service();
        let a = service.create(CreateTodo::new("a"));
        let b = service.create(CreateTodo::new("b"));
        let ids: Vec<TodoId> = service.get_all().iter().map(|t| t.id).collect();
        assert_eq!(ids, [a.id, b.id]);
    }

    #[test]
    fn update_title_only() {
        let (mut service, clock) = service();
        let todo = service.create(CreateTodo::new("Walk dog"));
        clock.advance(Duration::seconds(1));
        let patch = UpdateTodo {
            title: Some("Walk cat".to_string()),
            completed: None,
        };
        let updated = service.update(todo.id, patch).unwrap();
        assert_eq!(updated.title, "Walk cat");
        assert!(!updated.completed);
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at > todo.updated_at);
    }

    #[test]
    fn update_never_moves_updated_at_before_created_at() {
        let (mut service, clock) = service();
        clock.advance(Duration::hours(1));
        let todo = service.create(CreateTodo::new("Time travel"));
        clock.set(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
        let updated = service.update(todo.id, UpdateTodo::default()).unwrap();
        assert_eq!(updated.updated_at, todo.created_at);
    }

    #[test]
    fn users_are_stored_and_found_by_name() {
        let (mut service, _) = service();
        let ann = service
            .create_user(NewUser {
                username: "ann".to_string(),
                password: "hunter2".to_string(),
            })
            .unwrap();
        let bob = service
            .create_user(NewUser {
                username: "bob".to_string(),
                password: "pw".to_string(),
            })
            .unwrap();
        assert_eq!((ann.id, bob.id), (1, 2));
        assert_eq!(service.get_user(2), Some(bob.clone()));
        assert_eq!(service.get_user_by_username("ann"), Some(ann));
        assert_eq!(service.get_user_by_username("Ann"), None);
        assert_eq!(service.get_user(3), None);
    }

    #[test]
    fn duplicate_username_is_rejected_without_using_an_id() {
        let (mut service, _) = service();
        let ann = service
            .create_user(NewUser {
                username: "ann".to_string(),
                password: "a".to_string(),
            })
            .unwrap();

        let err = service
            .create_user(NewUser {
                username: "ann".to_string(),
                password: "b".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, UserError::UsernameTaken("ann".to_string()));
        assert_eq!(service.get_user_by_username("ann"), Some(ann));
        assert_eq!(service.get_user(2), None);

        let bob = service
            .create_user(NewUser {
                username: "bob".to_string(),
                password: "c".to_string(),
            })
            .unwrap();
        assert_eq!(bob.id, 2);
    }

    #[test]
    fn user_ids_do_not_consume_todo_ids() {
        let (mut service, _) = service();
        service
            .create_user(NewUser {
                username: "ann".to_string(),
                password: String::new(),
            })
            .unwrap();
        assert_eq!(service.create(CreateTodo::new("first")).id, 1);
    }
}
