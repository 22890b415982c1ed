use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::FitnessApi;
use crate::error::AppError;
use crate::models::{
    Exercise, NewProgressRequest, Program, ProgramFilter, ProgressRecord, User, Workout,
    WorkoutLookup,
};

#[derive(Default)]
struct Store {
    programs: Vec<Program>,
    workouts: Vec<Workout>,
    exercises: Vec<Exercise>,
    progress: Vec<ProgressRecord>,
    users: Vec<User>,
    next_id: i64,
    calls: HashMap<&'static str, usize>,
    failing: HashSet<&'static str>,
    lookup_as_collection: bool,
    latency: Option<Duration>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Collaborator kept entirely in memory for the test suites. Records how often
/// each operation is called.
#[derive(Default)]
pub struct InMemoryFitnessApi {
    store: Mutex<Store>,
}

impl InMemoryFitnessApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_program(&self, mut program: Program) -> Program {
        let mut store = self.store();
        if program.id == 0 {
            program.id = store.next_id();
        }
        program.workouts.clear();
        store.programs.push(program.clone());
        program
    }

    /// Adds a workout; nested exercises are stored separately.
    pub fn add_workout(&self, mut workout: Workout) -> Workout {
        let mut store = self.store();
        if workout.id == 0 {
            workout.id = store.next_id();
        }
        let exercises = std::mem::take(&mut workout.exercises);
        for mut exercise in exercises {
            if exercise.id == 0 {
                exercise.id = store.next_id();
            }
            exercise.workout_id = workout.id;
            store.exercises.push(exercise);
        }
        store.workouts.push(workout.clone());
        drop(store);
        self.with_exercises(workout)
    }

    pub fn add_user(&self, external_id: &str) -> User {
        let mut store = self.store();
        let user = User {
            id: store.next_id(),
            external_id: external_id.to_string(),
            created_at: Some(Utc::now().naive_utc()),
        };
        store.users.push(user.clone());
        user
    }

    /// Inserts a record directly, bypassing the create endpoint.
    pub fn seed_progress(&self, mut record: ProgressRecord) -> ProgressRecord {
        let mut store = self.store();
        if record.id == 0 {
            record.id = store.next_id();
        }
        store.progress.push(record.clone());
        record
    }

    pub fn progress_for(&self, user_id: i64, workout_id: i64) -> Vec<ProgressRecord> {
        self.store()
            .progress
            .iter()
            .filter(|p| p.user_id == user_id && p.workout_id == workout_id)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.store().calls.get(operation).copied().unwrap_or(0)
    }

    /// Makes `operation` fail with a server error until `recover` is called.
    pub fn fail(&self, operation: &'static str) {
        self.store().failing.insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.store().failing.remove(operation);
    }

    /// Answers workout lookups with the whole program's collection.
    pub fn answer_lookup_with_collection(&self, enabled: bool) {
        self.store().lookup_as_collection = enabled;
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        self.store().latency = latency;
    }

    async fn enter(&self, operation: &'static str) -> Result<(), AppError> {
        let latency = {
            let mut store = self.store();
            *store.calls.entry(operation).or_insert(0) += 1;
            store.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.store().failing.contains(operation) {
            return Err(AppError::Api {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn with_exercises(&self, mut workout: Workout) -> Workout {
        workout.exercises = self
            .store()
            .exercises
            .iter()
            .filter(|e| e.workout_id == workout.id)
            .cloned()
            .collect();
        workout
    }
}

#[async_trait]
impl FitnessApi for InMemoryFitnessApi {
    async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>, AppError> {
        self.enter("list_programs").await?;
        let search = filter.search.as_ref().map(|s| s.to_lowercase());
        let programs = self
            .store()
            .programs
            .iter()
            .filter(|p| filter.difficulty.is_none_or(|d| p.difficulty == d))
            .filter(|p| filter.goal.is_none_or(|g| p.goal == g))
            .filter(|p| filter.location.is_none_or(|l| p.location == l))
            .filter(|p| {
                search
                    .as_ref()
                    .is_none_or(|s| p.name.to_lowercase().contains(s.as_str()))
            })
            .cloned()
            .collect();
        Ok(programs)
    }

    async fn list_program_workouts(&self, program_id: i64) -> Result<Vec<Workout>, AppError> {
        self.enter("list_program_workouts").await?;
        let workouts: Vec<Workout> = self
            .store()
            .workouts
            .iter()
            .filter(|w| w.program_id == program_id)
            .cloned()
            .collect();
        Ok(workouts.into_iter().map(|w| self.with_exercises(w)).collect())
    }

    async fn get_workout(&self, workout_id: i64) -> Result<WorkoutLookup, AppError> {
        self.enter("get_workout").await?;
        let (found, as_collection, siblings) = {
            let store = self.store();
            let found = store.workouts.iter().find(|w| w.id == workout_id).cloned();
            let siblings: Vec<Workout> = match &found {
                Some(w) => store
                    .workouts
                    .iter()
                    .filter(|s| s.program_id == w.program_id)
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };
            (found, store.lookup_as_collection, siblings)
        };

        match found {
            None => Err(AppError::NotFound),
            Some(_) if as_collection => Ok(WorkoutLookup::Collection(siblings)),
            Some(workout) => Ok(WorkoutLookup::Single(self.with_exercises(workout))),
        }
    }

    async fn list_exercises(&self, workout_id: i64) -> Result<Vec<Exercise>, AppError> {
        self.enter("list_exercises").await?;
        let store = self.store();
        if !store.workouts.iter().any(|w| w.id == workout_id) {
            return Err(AppError::NotFound);
        }
        Ok(store
            .exercises
            .iter()
            .filter(|e| e.workout_id == workout_id)
            .cloned()
            .collect())
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError> {
        self.enter("list_progress").await?;
        Ok(self
            .store()
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_progress(&self, req: &NewProgressRequest) -> Result<ProgressRecord, AppError> {
        self.enter("create_progress").await?;
        let mut store = self.store();
        if !store.workouts.iter().any(|w| w.id == req.workout_id) {
            return Err(AppError::NotFound);
        }
        let record = ProgressRecord {
            id: store.next_id(),
            user_id: req.user_id,
            program_id: req.program_id,
            workout_id: req.workout_id,
            is_completed: req.is_completed,
            completed_at: None,
        };
        store.progress.push(record.clone());
        Ok(record)
    }

    async fn update_progress_completion(
        &self,
        progress_id: i64,
        is_completed: bool,
    ) -> Result<ProgressRecord, AppError> {
        self.enter("update_progress_completion").await?;
        let mut store = self.store();
        let record = store
            .progress
            .iter_mut()
            .find(|p| p.id == progress_id)
            .ok_or(AppError::NotFound)?;
        record.is_completed = is_completed;
        record.completed_at = is_completed.then(|| Utc::now().naive_utc());
        Ok(record.clone())
    }

    async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        self.enter("find_user").await?;
        Ok(self
            .store()
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn create_user(&self, external_id: &str) -> Result<User, AppError> {
        self.enter("create_user").await?;
        if self.store().users.iter().any(|u| u.external_id == external_id) {
            return Err(AppError::Api {
                status: 400,
                message: "User already registered".to_string(),
            });
        }
        Ok(self.add_user(external_id))
    }
}
