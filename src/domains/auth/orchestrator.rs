use super::action::AuthAction;
use crate::domains::{guarded, require};
use crate::effect::Effect;
use crate::environment::error::ApiError;
use crate::environment::types::{Credentials, Session, User};
use crate::environment::{Environment, Repository};

/// Side effects for the auth domain. This is the only writer of the session
/// handle and of the session store. Both are written from result arms, which
/// run on the store loop in order with `Logout`; futures only return data.
pub fn orchestrate(action: &AuthAction, environment: &Environment) -> Effect<AuthAction> {
    match action {
        AuthAction::Login(id, credentials) => {
            let id = *id;
            if let Err(e) = validate(credentials) {
                return Effect::action(AuthAction::LoggedIn(id, Err(e)));
            }
            let credentials = credentials.clone();
            let backend = environment.backend.clone();
            Effect::future(
                async move {
                    let response = backend.login(&credentials).await?;
                    // The profile is only loaded on request; keep the id for now
                    let user = User::placeholder(response.user_id.clone());
                    Ok::<_, ApiError>(
                        Session::authenticated(response.token, response.user_id).with_user(user),
                    )
                },
                move |r| AuthAction::LoggedIn(id, r),
            )
        }
        AuthAction::Register(id, credentials) => {
            let id = *id;
            if let Err(e) = validate(credentials) {
                return Effect::action(AuthAction::Registered(id, Err(e)));
            }
            let credentials = credentials.clone();
            let backend = environment.backend.clone();
            Effect::future(
                async move {
                    let response = backend.register(&credentials).await?;
                    let user = match backend.with_token(&response.token).user_details().await {
                        Ok(user) => user,
                        Err(e) => {
                            log::warn!("Could not load new profile, using placeholder: {e}");
                            User::placeholder(response.user_id.clone())
                        }
                    };
                    Ok::<_, ApiError>(
                        Session::authenticated(response.token, response.user_id).with_user(user),
                    )
                },
                move |r| AuthAction::Registered(id, r),
            )
        }
        AuthAction::LoggedIn(_, Ok(session)) | AuthAction::Registered(_, Ok(session)) => {
            persist(&environment.repository, session);
            environment.session.set(session.clone());
            Effect::NONE
        }
        AuthAction::FetchUser(id) => {
            let id = *id;
            guarded(
                environment,
                Ok(()),
                |backend| async move { backend.user_details().await },
                move |r| AuthAction::UserFetched(id, r),
            )
        }
        AuthAction::UpdateProfile(id, update) => {
            let id = *id;
            let update = update.clone();
            guarded(
                environment,
                Ok(()),
                |backend| async move { backend.update_profile(&update).await },
                move |r| AuthAction::ProfileUpdated(id, r),
            )
        }
        AuthAction::UserFetched(_, Ok(user)) | AuthAction::ProfileUpdated(_, Ok(user)) => {
            if let Err(e) = environment.repository.update_user(user) {
                log::error!("Could not update stored profile: {e}");
            }
            environment.session.set_user(user.clone());
            Effect::NONE
        }
        AuthAction::Logout | AuthAction::SessionInvalidated => {
            if matches!(action, AuthAction::SessionInvalidated) {
                log::warn!("Session rejected by the server, signing out");
            }
            if let Err(e) = environment.repository.clear() {
                log::error!("Could not clear stored session: {e}");
            }
            environment.session.clear();
            Effect::NONE
        }
        AuthAction::Restore(session) => {
            environment.session.set(session.clone());
            Effect::NONE
        }
        _ => Effect::NONE,
    }
}

fn validate(credentials: &Credentials) -> Result<(), ApiError> {
    require(&credentials.email, "Email")?;
    require(&credentials.password, "Password")
}

fn persist(repository: &Repository, session: &Session) {
    let (Some(token), Some(user)) = (session.token(), session.user.as_ref()) else {
        log::warn!("Not persisting an incomplete session");
        return;
    };
    if let Err(e) = repository.save(token, user) {
        log::error!("Could not persist session: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::testing::{environment, resolve};
    use crate::effect::RequestId;
    use crate::environment::mock::MockBackend;
    use crate::environment::types::ProfileUpdate;

    #[tokio::test]
    async fn login_persists_placeholder_and_mirrors_session() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, false);
        let action = AuthAction::Login(RequestId::next(), Credentials::new("a@b.c", "pw"));
        let results = resolve(orchestrate(&action, &env)).await;
        let session = match &results[..] {
            [AuthAction::LoggedIn(_, Ok(session))] => session.clone(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(session.token(), Some("token-for-a@b.c"));
        assert_eq!(mock.calls_to("user_details"), 0);

        // Nothing is written until the result is handled
        assert!(env.repository.load().is_none());
        assert!(env.session.token().is_none());
        orchestrate(&results[0], &env);
        let stored = env.repository.load().unwrap();
        assert_eq!(stored.user.unwrap().id, "u1");
        assert_eq!(env.session.token().as_deref(), Some("token-for-a@b.c"));
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_server() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, false);
        let action = AuthAction::Login(RequestId::next(), Credentials::new("", "pw"));
        let results = resolve(orchestrate(&action, &env)).await;
        assert!(matches!(
            &results[..],
            [AuthAction::LoggedIn(_, Err(ApiError::Invalid(_)))]
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn register_loads_profile_with_new_token() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, false);
        let action = AuthAction::Register(RequestId::next(), Credentials::new("new@b.c", "pw"));
        let results = resolve(orchestrate(&action, &env)).await;
        match &results[..] {
            [AuthAction::Registered(_, Ok(session))] => {
                assert_eq!(session.user.as_ref().unwrap().email, "new@b.c");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(mock.tokens(), vec!["token-for-new@b.c".to_string()]);
    }

    #[tokio::test]
    async fn register_falls_back_to_placeholder_profile() {
        let mock = MockBackend::new();
        mock.fail(
            "user_details",
            ApiError::Status {
                status: 500,
                message: None,
            },
        );
        let (env, _dir) = environment(&mock, false);
        let action = AuthAction::Register(RequestId::next(), Credentials::new("new@b.c", "pw"));
        let results = resolve(orchestrate(&action, &env)).await;
        let user = match &results[..] {
            [AuthAction::Registered(_, Ok(session))] => session.user.clone().unwrap(),
            other => panic!("unexpected {other:?}"),
        };
        assert!(!user.id.is_empty());
        assert_eq!(user.email, "");

        orchestrate(&results[0], &env);
        let stored = env.repository.load().unwrap();
        assert_eq!(stored.user, Some(user));
    }

    #[tokio::test]
    async fn fetch_user_requires_token() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, false);
        let results = resolve(orchestrate(&AuthAction::FetchUser(RequestId::next()), &env)).await;
        assert!(matches!(
            &results[..],
            [AuthAction::UserFetched(_, Err(ApiError::AuthenticationRequired))]
        ));
        let update = AuthAction::UpdateProfile(RequestId::next(), ProfileUpdate::default());
        let results = resolve(orchestrate(&update, &env)).await;
        assert!(matches!(
            &results[..],
            [AuthAction::ProfileUpdated(_, Err(ApiError::AuthenticationRequired))]
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn logout_clears_store_and_handle() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        env.repository
            .save("token", &User::placeholder("u1"))
            .unwrap();
        assert!(orchestrate(&AuthAction::Logout, &env).is_none());
        assert!(env.repository.load().is_none());
        assert!(env.session.token().is_none());
        // Clearing twice is not an error
        orchestrate(&AuthAction::SessionInvalidated, &env);
    }

    #[tokio::test]
    async fn profile_result_updates_store_only_when_handled() {
        let mock = MockBackend::new();
        mock.set_user(User {
            id: "u1".into(),
            email: "a@b.c".into(),
            ..Default::default()
        });
        let (env, _dir) = environment(&mock, true);
        env.repository
            .save("token", &User::placeholder("u1"))
            .unwrap();
        let results = resolve(orchestrate(&AuthAction::FetchUser(RequestId::next()), &env)).await;
        assert_eq!(env.repository.load().unwrap().user.unwrap().email, "");

        orchestrate(&results[0], &env);
        assert_eq!(env.repository.load().unwrap().user.unwrap().email, "a@b.c");
    }

    #[tokio::test]
    async fn result_finished_before_logout_is_not_written_after_it() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, false);
        let action = AuthAction::Login(RequestId::next(), Credentials::new("a@b.c", "pw"));
        // The request completes while the user logs out
        let results = resolve(orchestrate(&action, &env)).await;
        orchestrate(&AuthAction::Logout, &env);
        assert!(env.repository.load().is_none());
        assert!(matches!(&results[..], [AuthAction::LoggedIn(_, Ok(_))]));
    }
}
