use clientdesk_api::{ClientResource, ProjectResource, RequestContext, Status};
use clientdesk_core::db::open_db_in_memory;
use rusqlite::{params, Connection};
use serde_json::{json, Value};

const REQUESTER: i64 = 1;
const CLIENT: i64 = 3;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    for (id, username) in [(1, "owner"), (5, "u5"), (7, "u7")] {
        conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?2);",
            params![id, username],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO clients (id, client_name, created_by, created_at, updated_at)
         VALUES (?1, 'Acme', ?2, 1000, 1000);",
        params![CLIENT, REQUESTER],
    )
    .unwrap();
    conn
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

fn create(conn: &Connection, requester: i64, body: Value) -> Value {
    let resource = ProjectResource::try_new(conn).unwrap();
    let response = resource.create(&RequestContext::new(requester), CLIENT, &body);
    assert_eq!(response.status, Status::Created);
    response.body.unwrap()
}

#[test]
fn create_assigns_users_and_stamps_creator() {
    let conn = setup();

    let body = create(
        &conn,
        REQUESTER,
        json!({ "project_name": "P", "users": [{ "id": 5 }, { "id": 7 }], "created_by": 7 }),
    );

    assert_eq!(body["project_name"], "P");
    assert_eq!(body["client"], CLIENT);
    assert_eq!(body["users"], json!([5, 7]));
    assert_eq!(body["created_by"], REQUESTER);
    assert_eq!(count(&conn, "project_users"), 2);
}

#[test]
fn user_entry_ids_may_be_numeric_strings() {
    let conn = setup();

    let body = create(
        &conn,
        REQUESTER,
        json!({ "project_name": "P", "users": [{ "id": "7" }, { "id": 5, "name": "ignored" }] }),
    );

    assert_eq!(body["users"], json!([5, 7]));
}

#[test]
fn business_rule_failures_return_error_messages_and_write_nothing() {
    let conn = setup();
    let cases = [
        (json!({ "users": [{ "id": 5 }] }), "Project name is required"),
        (json!({ "project_name": "", "users": [{ "id": 5 }] }), "Project name is required"),
        (json!({ "project_name": "P" }), "Users list is required"),
        (json!({ "project_name": "P", "users": [] }), "Users list is required"),
        (json!({ "project_name": "P", "users": null }), "Users list is required"),
        (json!({ "project_name": "P", "users": [{ "name": "x" }] }), "Invalid user data format"),
        (json!({ "project_name": "P", "users": [{ "id": 5 }, 7] }), "Invalid user data format"),
        (json!({ "project_name": "P", "users": "5" }), "Invalid user data format"),
    ];

    {
        let resource = ProjectResource::try_new(&conn).unwrap();
        let ctx = RequestContext::new(REQUESTER);
        for (body, message) in cases {
            let response = resource.create(&ctx, CLIENT, &body);
            assert_eq!(response.status, Status::BadRequest, "body: {body}");
            assert_eq!(response.body, Some(json!({ "error": message })), "body: {body}");
        }
    }

    assert_eq!(count(&conn, "projects"), 0);
    assert_eq!(count(&conn, "project_users"), 0);
}

#[test]
fn unknown_user_or_client_returns_404_without_partial_writes() {
    let conn = setup();
    {
        let resource = ProjectResource::try_new(&conn).unwrap();
        let ctx = RequestContext::new(REQUESTER);

        let unknown_user = resource.create(
            &ctx,
            CLIENT,
            &json!({ "project_name": "P", "users": [{ "id": 5 }, { "id": 999 }] }),
        );
        assert_eq!(unknown_user.status, Status::NotFound);
        assert_eq!(unknown_user.body, Some(json!({ "detail": "Not found." })));

        let null_id = resource.create(
            &ctx,
            CLIENT,
            &json!({ "project_name": "P", "users": [{ "id": 5 }, { "id": null }] }),
        );
        assert_eq!(null_id.status, Status::NotFound);
        assert_eq!(null_id.body, Some(json!({ "detail": "Not found." })));

        let unknown_client = resource.create(
            &ctx,
            999,
            &json!({ "project_name": "P", "users": [{ "id": 5 }] }),
        );
        assert_eq!(unknown_client.status, Status::NotFound);
    }

    assert_eq!(count(&conn, "projects"), 0);
    assert_eq!(count(&conn, "project_users"), 0);
}

#[test]
fn user_projects_lists_only_the_requesters_assignments() {
    let conn = setup();
    let p1 = create(&conn, REQUESTER, json!({ "project_name": "P1", "users": [{ "id": 5 }] }));
    create(&conn, REQUESTER, json!({ "project_name": "P2", "users": [{ "id": 7 }] }));
    let p3 = create(
        &conn,
        REQUESTER,
        json!({ "project_name": "P3", "users": [{ "id": 5 }, { "id": 7 }] }),
    );

    let resource = ProjectResource::try_new(&conn).unwrap();
    let mine = resource.user_projects(&RequestContext::new(5));
    assert_eq!(mine.status, Status::Ok);
    assert_eq!(mine.body, Some(json!([p1, p3])));

    let none = resource.user_projects(&RequestContext::new(REQUESTER));
    assert_eq!(none.body, Some(json!([])));
}

#[test]
fn update_replaces_name_and_users() {
    let conn = setup();
    let created = create(
        &conn,
        REQUESTER,
        json!({ "project_name": "P", "users": [{ "id": 5 }] }),
    );
    let id = created["id"].as_i64().unwrap();

    let resource = ProjectResource::try_new(&conn).unwrap();
    let ctx = RequestContext::new(REQUESTER);
    let response = resource.update(
        &ctx,
        CLIENT,
        id,
        &json!({ "project_name": "Renamed", "users": [{ "id": 7 }] }),
    );
    assert_eq!(response.status, Status::Ok);
    let body = response.body.unwrap();
    assert_eq!(body["project_name"], "Renamed");
    assert_eq!(body["users"], json!([7]));
    assert_eq!(body["created_at"], created["created_at"]);

    let partial = resource.update(&ctx, CLIENT, id, &json!({ "project_name": "Only" }));
    assert_eq!(partial.status, Status::BadRequest);
    assert_eq!(resource.retrieve(&ctx, CLIENT, id).body, Some(body));
}

#[test]
fn project_routes_are_scoped_to_the_parent_client() {
    let conn = setup();
    conn.execute(
        "INSERT INTO clients (id, client_name, created_by, created_at, updated_at)
         VALUES (4, 'Globex', 1, 1000, 1000);",
        [],
    )
    .unwrap();
    let created = create(&conn, REQUESTER, json!({ "project_name": "P", "users": [{ "id": 5 }] }));
    let id = created["id"].as_i64().unwrap();

    let resource = ProjectResource::try_new(&conn).unwrap();
    let ctx = RequestContext::new(REQUESTER);

    assert_eq!(resource.retrieve(&ctx, 4, id).status, Status::NotFound);
    assert_eq!(resource.list(&ctx, 4).body, Some(json!([])));
    assert_eq!(resource.list(&ctx, CLIENT).body, Some(json!([created])));
    assert_eq!(resource.list(&ctx, 999).status, Status::NotFound);
    assert_eq!(resource.destroy(&ctx, 4, id).status, Status::NotFound);

    let destroyed = resource.destroy(&ctx, CLIENT, id);
    assert_eq!(destroyed.status, Status::NoContent);
    assert_eq!(destroyed.body, None);
    assert_eq!(resource.retrieve(&ctx, CLIENT, id).status, Status::NotFound);
}

#[test]
fn destroying_a_client_removes_its_projects() {
    let conn = setup();
    create(&conn, REQUESTER, json!({ "project_name": "P", "users": [{ "id": 5 }] }));

    let response = ClientResource::try_new(&conn)
        .unwrap()
        .destroy(&RequestContext::new(REQUESTER), CLIENT);
    assert_eq!(response.status, Status::NoContent);

    assert_eq!(count(&conn, "projects"), 0);
    assert_eq!(count(&conn, "project_users"), 0);
}

#[test]
fn project_name_is_stored_as_given() {
    let conn = setup();

    let padded = create(
        &conn,
        REQUESTER,
        json!({ "project_name": "  Launch ", "users": [{ "id": 5 }] }),
    );
    assert_eq!(padded["project_name"], "  Launch ");

    let resource = ProjectResource::try_new(&conn).unwrap();
    let ctx = RequestContext::new(REQUESTER);
    let id = padded["id"].as_i64().unwrap();
    assert_eq!(resource.retrieve(&ctx, CLIENT, id).body.unwrap()["project_name"], "  Launch ");
}

#[test]
fn client_and_project_handlers_share_one_connection() {
    let conn = setup();
    let clients = ClientResource::try_new(&conn).unwrap();
    let projects = ProjectResource::try_new(&conn).unwrap();
    let ctx = RequestContext::new(REQUESTER);

    let created = projects.create(
        &ctx,
        CLIENT,
        &json!({ "project_name": "P", "users": [{ "id": 5 }, { "id": 7 }] }),
    );
    assert_eq!(created.status, Status::Created);

    assert_eq!(clients.destroy(&ctx, CLIENT).status, Status::NoContent);
    assert_eq!(projects.list(&ctx, CLIENT).status, Status::NotFound);
    assert_eq!(projects.user_projects(&RequestContext::new(5)).body, Some(json!([])));
}
