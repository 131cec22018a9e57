//! Full user lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every
//! repository operation over real HTTP through `UreqClient`, so request
//! building, status mapping and response decoding are checked end to end.

use std::collections::HashSet;
use std::time::Duration;

use intercom_users::{
    ApiError, ClientConfig, UreqClient, User, UserApi, UserListParams, UserRepository, UserService,
};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn service(base_url: &str) -> UserService<UserApi<UreqClient>> {
    UserService::new(UserApi::new(UreqClient::new(ClientConfig::new(base_url))))
}

fn user(email: &str, name: &str) -> User {
    User {
        email: Some(email.to_string()),
        name: Some(name.to_string()),
        ..User::default()
    }
}

#[test]
fn user_lifecycle() {
    let users = service(&start_server());

    // Step 1: empty service lists nothing.
    let list = users.list(&UserListParams::default()).unwrap();
    assert!(list.users.is_empty());
    assert_eq!(list.total_count, Some(0));

    // Step 2: search for an unknown email is a synthesized 404.
    let err = users.find_by_email("mal@serenity.io").unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");

    // Step 3: save creates.
    let created = users.save(&user("mal@serenity.io", "Malcolm")).unwrap();
    let id = created.id.clone().expect("service assigns an id");
    assert_eq!(created.name.as_deref(), Some("Malcolm"));

    // Step 4: save with the same email updates in place.
    let mut update = user("mal@serenity.io", "Captain Reynolds");
    update.user_id = Some("1".to_string());
    update.unsubscribed_from_emails = Some(false);
    update
        .custom_attributes
        .insert("ship".to_string(), serde_json::json!("Serenity"));
    let updated = users.save(&update).unwrap();
    assert_eq!(updated.id.as_deref(), Some(id.as_str()));
    assert_eq!(updated.name.as_deref(), Some("Captain Reynolds"));
    assert_eq!(updated.unsubscribed_from_emails, Some(false));
    assert_eq!(updated.custom_attributes["ship"], "Serenity");

    // Step 5: every lookup path lands on the same user.
    assert_eq!(users.find_by_id(id.as_str()).unwrap(), updated);
    assert_eq!(users.find_by_email("mal@serenity.io").unwrap(), updated);
    assert_eq!(users.find_by_user_id("1").unwrap(), updated);

    // Step 6: add more users and page through them with scroll.
    for (email, name) in [
        ("zoe@serenity.io", "Zoe"),
        ("wash@serenity.io", "Wash"),
        ("jayne@serenity.io", "Jayne"),
        ("kaylee@serenity.io", "Kaylee"),
    ] {
        users.save(&user(email, name)).unwrap();
    }

    let mut seen = HashSet::new();
    let mut cursors = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = users.scroll(&cursor).unwrap();
        if page.users.is_empty() {
            break;
        }
        for u in page.users {
            assert!(seen.insert(u.id.unwrap()), "scroll repeated a user");
        }
        cursor = page.scroll_param.expect("non-empty page carries a cursor");
        cursors.push(cursor.clone());
    }
    assert_eq!(seen.len(), 5);
    let distinct: HashSet<_> = cursors.iter().collect();
    assert_eq!(distinct.len(), cursors.len(), "each page advances the cursor");

    // Step 7: list paging.
    let page = users
        .list(&UserListParams {
            page: Some(2),
            per_page: Some(2),
            ..UserListParams::default()
        })
        .unwrap();
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.pages.page, Some(2));
    assert_eq!(page.pages.total_pages, Some(3));
    assert_eq!(page.total_count, Some(5));

    // Step 8: delete returns the last known state.
    let deleted = users.delete(&id).unwrap();
    assert_eq!(deleted.email.as_deref(), Some("mal@serenity.io"));

    // Step 9: the genuine 404 carries the service's code and message.
    let err = users.find_by_id(id.as_str()).unwrap_err();
    let ApiError::Http(http) = err else {
        panic!("expected HTTP error");
    };
    assert_eq!(http.status, 404);
    assert_eq!(http.code, "not_found");
    assert_eq!(http.message, "User Not Found");

    // Step 10: deleting again is also a 404.
    assert!(users.delete(&id).unwrap_err().is_not_found());
}

#[test]
fn server_side_validation_errors_pass_through() {
    let users = UserApi::new(UreqClient::new(ClientConfig::new(&start_server())));

    let err = users.save(&User::default()).unwrap_err();
    assert_eq!(err.status(), Some(400));
    let ApiError::Http(http) = err else {
        panic!("expected HTTP error");
    };
    assert_eq!(http.code, "parameter_not_found");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let users = UserApi::new(UreqClient::new(ClientConfig::new(&format!(
        "http://127.0.0.1:{port}"
    ))));

    let err = users.scroll("").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[test]
fn configured_timeout_bounds_a_stalled_request() {
    // Accepts connections through the backlog but never answers.
    let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = silent.local_addr().unwrap();
    let config =
        ClientConfig::new(&format!("http://{addr}")).with_timeout(Duration::from_millis(200));
    let users = UserApi::new(UreqClient::new(config));

    let started = std::time::Instant::now();
    let err = users.scroll("").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
    drop(silent);
}
