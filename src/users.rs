use crate::errors::DomainError;
use crate::models::{generate_id, AuthType, User};
use crate::storage::{self, Store};
use chrono::Utc;
use tracing::info;

/// All local profiles. An empty directory alongside legacy un-prefixed
/// data migrates into a synthesized default profile, exactly once.
pub fn users(store: &mut Store) -> Vec<User> {
    let mut users: Vec<User> = store.get_json_or(storage::USERS_KEY, Vec::new());

    if users.is_empty() && store.get(storage::LEGACY_HABITS_KEY).is_some() {
        info!("migrating legacy data to default profile");
        let default_user = User {
            id: "default".to_string(),
            name: "My Profile".to_string(),
            email: "default@local".to_string(),
            auth_type: AuthType::Password,
            password: None,
            created_at: Utc::now().timestamp_millis(),
        };

        if let Some(habits) = store.get(storage::LEGACY_HABITS_KEY) {
            store.set(&storage::habits_key(&default_user.id), habits);
        }
        if let Some(logs) = store.get(storage::LEGACY_LOGS_KEY) {
            store.set(&storage::logs_key(&default_user.id), logs);
        }
        if let Some(settings) = store.get(storage::LEGACY_SETTINGS_KEY) {
            store.set(&storage::settings_key(&default_user.id), settings);
        }

        store.set(storage::CURRENT_USER_KEY, default_user.id.clone());
        users.push(default_user);
        store.set_json(storage::USERS_KEY, &users);
    }

    users
}

pub fn register(
    store: &mut Store,
    name: &str,
    email: &str,
    password: Option<String>,
    auth_type: AuthType,
) -> Result<User, DomainError> {
    let mut users = users(store);
    if users.iter().any(|u| u.email == email) {
        return Err(DomainError::DuplicateUser(email.to_string()));
    }

    let user = User {
        id: generate_id(),
        name: name.to_string(),
        email: email.to_string(),
        auth_type,
        password,
        created_at: Utc::now().timestamp_millis(),
    };
    users.push(user.clone());
    store.set_json(storage::USERS_KEY, &users);

    // New profiles start from a blank routine; categories are seeded on
    // first catalog access instead.
    store.set(&storage::habits_key(&user.id), "[]".to_string());

    Ok(user)
}

pub fn authenticate(
    store: &mut Store,
    email: &str,
    password: Option<&str>,
) -> Result<User, DomainError> {
    let users = users(store);
    let user = users
        .iter()
        .find(|u| u.email == email)
        .ok_or(DomainError::UserNotFound)?;

    // Plaintext compare, password accounts only. Social accounts skip it.
    if user.auth_type == AuthType::Password && user.password.as_deref() != password {
        return Err(DomainError::InvalidCredentials);
    }

    Ok(user.clone())
}

pub fn login(store: &mut Store, user_id: &str) {
    store.set(storage::CURRENT_USER_KEY, user_id.to_string());
}

pub fn logout(store: &mut Store) {
    store.remove(storage::CURRENT_USER_KEY);
}

pub fn current_user(store: &mut Store) -> Option<User> {
    let uid = store.get(storage::CURRENT_USER_KEY)?;
    users(store).into_iter().find(|u| u.id == uid)
}

/// A missing or dangling session pointer reports `NoSessionActive`.
pub fn require_session(store: &mut Store) -> Result<String, DomainError> {
    current_user(store)
        .map(|u| u.id)
        .ok_or(DomainError::NoSessionActive)
}

/// Removes the profile and everything in its namespace.
pub fn delete_account(store: &mut Store, user_id: &str) {
    let mut users = users(store);
    users.retain(|u| u.id != user_id);
    store.set_json(storage::USERS_KEY, &users);

    store.remove(&storage::habits_key(user_id));
    store.remove(&storage::logs_key(user_id));
    store.remove(&storage::settings_key(user_id));
    store.remove(&storage::categories_key(user_id));

    if store.get(storage::CURRENT_USER_KEY).as_deref() == Some(user_id) {
        store.remove(storage::CURRENT_USER_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_default(store: &mut Store, email: &str) -> User {
        register(
            store,
            "Jan",
            email,
            Some("secret".to_string()),
            AuthType::Password,
        )
        .unwrap()
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let mut store = Store::in_memory();
        register_default(&mut store, "a@b.c");
        let err = register(
            &mut store,
            "Other",
            "a@b.c",
            Some("pw".to_string()),
            AuthType::Password,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::DuplicateUser("a@b.c".to_string()));
    }

    #[test]
    fn register_initializes_empty_habit_list() {
        let mut store = Store::in_memory();
        let user = register_default(&mut store, "a@b.c");
        assert_eq!(
            store.get(&storage::habits_key(&user.id)).as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn authenticate_distinguishes_missing_user_from_bad_password() {
        let mut store = Store::in_memory();
        register_default(&mut store, "a@b.c");

        assert_eq!(
            authenticate(&mut store, "x@y.z", Some("secret")).unwrap_err(),
            DomainError::UserNotFound
        );
        assert_eq!(
            authenticate(&mut store, "a@b.c", Some("wrong")).unwrap_err(),
            DomainError::InvalidCredentials
        );
        assert!(authenticate(&mut store, "a@b.c", Some("secret")).is_ok());
    }

    #[test]
    fn social_accounts_skip_password_compare() {
        let mut store = Store::in_memory();
        register(&mut store, "G", "g@mail.com", None, AuthType::Google).unwrap();
        assert!(authenticate(&mut store, "g@mail.com", None).is_ok());
    }

    #[test]
    fn require_session_fails_without_login_and_after_logout() {
        let mut store = Store::in_memory();
        let user = register_default(&mut store, "a@b.c");
        assert_eq!(
            require_session(&mut store).unwrap_err(),
            DomainError::NoSessionActive
        );

        login(&mut store, &user.id);
        assert_eq!(require_session(&mut store).unwrap(), user.id);

        logout(&mut store);
        assert_eq!(
            require_session(&mut store).unwrap_err(),
            DomainError::NoSessionActive
        );
    }

    #[test]
    fn dangling_session_pointer_is_not_a_session() {
        let mut store = Store::in_memory();
        login(&mut store, "ghost");
        assert_eq!(
            require_session(&mut store).unwrap_err(),
            DomainError::NoSessionActive
        );
    }

    #[test]
    fn delete_account_removes_all_namespaced_collections_and_session() {
        let mut store = Store::in_memory();
        let user = register_default(&mut store, "a@b.c");
        login(&mut store, &user.id);
        store.set(&storage::logs_key(&user.id), "[]".to_string());
        store.set(&storage::settings_key(&user.id), "{}".to_string());
        store.set(&storage::categories_key(&user.id), "[]".to_string());

        delete_account(&mut store, &user.id);

        assert!(users(&mut store).is_empty());
        assert!(store.get(&storage::habits_key(&user.id)).is_none());
        assert!(store.get(&storage::logs_key(&user.id)).is_none());
        assert!(store.get(&storage::settings_key(&user.id)).is_none());
        assert!(store.get(&storage::categories_key(&user.id)).is_none());
        assert!(store.get(storage::CURRENT_USER_KEY).is_none());
    }

    #[test]
    fn deleting_another_account_keeps_the_session() {
        let mut store = Store::in_memory();
        let keep = register_default(&mut store, "keep@b.c");
        let drop = register_default(&mut store, "drop@b.c");
        login(&mut store, &keep.id);

        delete_account(&mut store, &drop.id);

        assert_eq!(require_session(&mut store).unwrap(), keep.id);
        assert_eq!(users(&mut store).len(), 1);
    }

    #[test]
    fn legacy_data_migrates_into_a_default_profile_once() {
        let mut store = Store::in_memory();
        store.set(storage::LEGACY_HABITS_KEY, "[]".to_string());
        store.set(storage::LEGACY_LOGS_KEY, "[]".to_string());

        let migrated = users(&mut store);
        assert_eq!(migrated.len(), 1);
        assert_eq!(migrated[0].id, "default");
        assert!(store.get(&storage::habits_key("default")).is_some());
        assert!(store.get(&storage::logs_key("default")).is_some());
        assert_eq!(
            store.get(storage::CURRENT_USER_KEY).as_deref(),
            Some("default")
        );

        // A second read must not mint another profile.
        assert_eq!(users(&mut store).len(), 1);
    }

    #[test]
    fn no_migration_without_legacy_data() {
        let mut store = Store::in_memory();
        assert!(users(&mut store).is_empty());
    }
}
