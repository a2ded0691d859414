use crate::common::{TestApp, routes};

mod register {
    use super::*;

    #[tokio::test]
    async fn register_creates_user() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({ "username": "operator1", "password": "pass1234" }),
            )
            .await;

        assert_eq!(res.status, 201, "body: {}", res.text);
        assert_eq!(res.body["username"].as_str().unwrap(), "operator1");
        assert!(res.body["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let app = TestApp::spawn().await;
        let body = serde_json::json!({ "username": "operator2", "password": "pass1234" });

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201);

        let second = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.error(), "Username is already taken");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({ "username": "operator3", "password": "short" }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Password must be 8-128 characters");
    }

    #[tokio::test]
    async fn invalid_username_characters_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({ "username": "not valid!", "password": "pass1234" }),
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("operator4", "pass1234").await;

        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        let _ = app.create_authenticated_user("operator5", "pass1234").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({ "username": "operator5", "password": "wrong-pass" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error(), "Invalid username or password");
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({ "username": "ghost", "password": "pass1234" }),
            )
            .await;

        assert_eq!(res.status, 401);
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn me_returns_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("operator6", "pass1234").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"].as_str().unwrap(), "operator6");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
    }
}
