// src/store/memory.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::{
    models::{
        attempt::{AttemptFilter, NewQuizAttempt, QuizAttempt},
        stats::{StatsDelta, UserQuizAggregate},
        user::{NewUser, UpdateProfileRequest, User},
    },
    store::{AttemptRepository, StatsRepository, StoreError, UserRepository},
};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    attempts: Vec<QuizAttempt>,
    aggregates: HashMap<i64, UserQuizAggregate>,
}

/// Process-local store for tests and runs without a database.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }

        let now = Utc::now();
        let created = User {
            id: state.users.len() as i64 + 1,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            branch: None,
            semester: None,
            roll_num: None,
            avatar_url: None,
            github: String::new(),
            linkedin: String::new(),
            instagram: String::new(),
            reddit: String::new(),
            discord: String::new(),
            streak: 0,
            last_login_date: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_profile(&self, id: i64, update: &UpdateProfileRequest) -> Result<User, StoreError> {
        let mut state = self.lock()?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;

        fn set(field: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                field.clone_from(v);
            }
        }
        fn set_opt(field: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                field.clone_from(value);
            }
        }

        set(&mut user.first_name, &update.first_name);
        set(&mut user.last_name, &update.last_name);
        set_opt(&mut user.branch, &update.branch);
        set_opt(&mut user.semester, &update.semester);
        set_opt(&mut user.roll_num, &update.roll_num);
        set_opt(&mut user.avatar_url, &update.avatar_url);
        set(&mut user.github, &update.github);
        set(&mut user.linkedin, &update.linkedin);
        set(&mut user.instagram, &update.instagram);
        set(&mut user.reddit, &update.reddit);
        set(&mut user.discord, &update.discord);
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn record_login(&self, id: i64, streak: i64, date: NaiveDate) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.streak = streak;
        user.last_login_date = Some(date);
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryStore {
    async fn append_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt, StoreError> {
        let mut state = self.lock()?;
        let saved = QuizAttempt::from_new(state.attempts.len() as i64 + 1, attempt);
        state.attempts.push(saved.clone());
        Ok(saved)
    }

    async fn list_attempts(
        &self,
        user_id: i64,
        filter: &AttemptFilter,
    ) -> Result<Vec<QuizAttempt>, StoreError> {
        let state = self.lock()?;
        let mut attempts: Vec<QuizAttempt> = state
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && filter.matches(a))
            .cloned()
            .collect();
        attempts.sort_by(|a, b| {
            b.attempted_at
                .cmp(&a.attempted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(attempts)
    }
}

#[async_trait]
impl StatsRepository for InMemoryStore {
    async fn apply_delta(&self, user_id: i64, delta: &StatsDelta) -> Result<(), StoreError> {
        self.lock()?
            .aggregates
            .entry(user_id)
            .or_default()
            .apply(delta);
        Ok(())
    }

    async fn get_aggregate(&self, user_id: i64) -> Result<Option<UserQuizAggregate>, StoreError> {
        Ok(self.lock()?.aggregates.get(&user_id).cloned())
    }
}
