mod common;

use common::{json, TestApp};
use recipe_api::{cryptography::verify_password, repository::Repository, schema::RecipeFields};
use rust_decimal::Decimal;
use serde_json::json;
use warp::http::StatusCode;

#[tokio::test]
async fn users_list_for_staff() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;

    let res = app
        .send("GET", "/api/admin/users/", Some(&app.auth(&admin)), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json(&res);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], admin.id);
    assert_eq!(rows[1]["email"], user.email);
    assert_eq!(rows[1]["name"], user.name);
    assert!(rows[1].get("password").is_none());
}

#[tokio::test]
async fn regular_user_is_forbidden() {
    let app = TestApp::new();
    let user = app.create_user("user@example.com", "AnyTEst3454").await;

    for path in ["/api/admin/users/", "/api/admin/recipes/", "/api/admin/tags/"] {
        let res = app.send("GET", path, Some(&app.auth(&user)), None).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{path}");
        assert_eq!(
            json(&res),
            json!({ "detail": "You do not have permission to perform this action." })
        );
    }
}

#[tokio::test]
async fn staff_cannot_edit_users() {
    let app = TestApp::new();
    let mut staff = app.create_user("staff@example.com", "AnyTEst3454").await;
    staff.is_staff = true;
    let staff = app.repo.save_user(&staff).await.unwrap();
    let user = app.create_user("user@example.com", "AnyTEst3454").await;

    let res = app
        .send(
            "GET",
            &format!("/api/admin/users/{}/", user.id),
            Some(&app.auth(&staff)),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .send(
            "PATCH",
            &format!("/api/admin/users/{}/", user.id),
            Some(&app.auth(&staff)),
            Some(json!({ "is_staff": true })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn superuser_edits_permissions() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;

    let res = app
        .send(
            "PATCH",
            &format!("/api/admin/users/{}/", user.id),
            Some(&app.auth(&admin)),
            Some(json!({ "is_staff": true, "is_active": false })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(&res)["is_staff"], true);

    let user = app.repo.find_user(user.id).await.unwrap().unwrap();
    assert!(user.is_staff);
    assert!(!user.is_active);
    assert!(!user.is_superuser);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;

    let res = app
        .send("GET", "/api/admin/users/999/", Some(&app.auth(&admin)), None)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recipes_and_tags_across_owners() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;
    app.repo.insert_recipe(user.id, soup()).await.unwrap();
    app.repo.insert_tag(user.id, "Vegan").await.unwrap();
    app.repo.insert_tag(admin.id, "Admin tag").await.unwrap();

    let res = app
        .send("GET", "/api/admin/recipes/", Some(&app.auth(&admin)), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json(&res);
    assert_eq!(body[0]["user"], user.id);
    assert_eq!(body[0]["title"], "Soup");
    assert_eq!(body[0]["price"], "5.50");

    let res = app
        .send("GET", "/api/admin/tags/", Some(&app.auth(&admin)), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(&res).as_array().unwrap().len(), 2);
}

fn soup() -> RecipeFields {
    RecipeFields {
        title: String::from("Soup"),
        time_minutes: 5,
        price: Decimal::new(550, 2),
        description: String::new(),
        link: String::new(),
    }
}

#[tokio::test]
async fn superuser_adds_user_with_flags() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let payload = json!({
        "email": "new@EXAMPLE.com",
        "password": "NewPass123",
        "is_staff": true,
    });

    let res = app
        .send("POST", "/api/admin/users/", Some(&app.auth(&admin)), Some(payload))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = json(&res);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_staff"], true);
    assert_eq!(body["is_superuser"], false);

    let user = app
        .repo
        .find_user_by_email("new@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(verify_password("NewPass123", &user.password).unwrap());
}

#[tokio::test]
async fn add_user_validates_fields() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;

    let res = app
        .send(
            "POST",
            "/api/admin/users/",
            Some(&app.auth(&admin)),
            Some(json!({ "email": "TestAdmin@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&res),
        json!({
            "email": ["user with this email already exists."],
            "password": ["Ensure this field has at least 5 characters."],
        })
    );
}

#[tokio::test]
async fn staff_cannot_add_users() {
    let app = TestApp::new();
    let mut staff = app.create_user("staff@example.com", "AnyTEst3454").await;
    staff.is_staff = true;
    let staff = app.repo.save_user(&staff).await.unwrap();

    let res = app
        .send(
            "POST",
            "/api/admin/users/",
            Some(&app.auth(&staff)),
            Some(json!({ "email": "new@example.com", "password": "NewPass123" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(app
        .repo
        .find_user_by_email("new@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn superuser_changes_email_and_password() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;

    let res = app
        .send(
            "PATCH",
            &format!("/api/admin/users/{}/", user.id),
            Some(&app.auth(&admin)),
            Some(json!({ "email": "renamed@example.com", "password": "Changed123" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(&res)["email"], "renamed@example.com");

    let user = app.repo.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(user.email, "renamed@example.com");
    assert!(verify_password("Changed123", &user.password).unwrap());
}

#[tokio::test]
async fn superuser_deletes_user_and_their_rows() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;
    app.repo.insert_recipe(user.id, soup()).await.unwrap();

    let url = format!("/api/admin/users/{}/", user.id);
    let res = app.send("DELETE", &url, Some(&app.auth(&admin)), None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(app.repo.find_user(user.id).await.unwrap().is_none());
    assert!(app.repo.list_recipes(None).await.unwrap().is_empty());

    let res = app.send("DELETE", &url, Some(&app.auth(&admin)), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn superuser_manages_recipes_for_any_owner() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;
    let other = app.create_user("other@example.com", "AnyTEst3454").await;

    let res = app
        .send(
            "POST",
            "/api/admin/recipes/",
            Some(&app.auth(&admin)),
            Some(json!({ "user": user.id, "title": "Stew", "time_minutes": 40, "price": "7.25" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = json(&res);
    assert_eq!(body["user"], user.id);
    assert_eq!(body["price"], "7.25");
    let id = body["id"].as_i64().unwrap() as i32;

    let res = app
        .send("GET", "/api/recipe/recipes/", Some(&app.auth(&user)), None)
        .await;
    assert_eq!(json(&res)[0]["title"], "Stew");

    let url = format!("/api/admin/recipes/{id}/");
    let res = app
        .send(
            "PATCH",
            &url,
            Some(&app.auth(&admin)),
            Some(json!({ "user": other.id, "title": "Moved Stew" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let recipe = app.repo.find_recipe(None, id).await.unwrap().unwrap();
    assert_eq!(recipe.user_id, other.id);
    assert_eq!(recipe.title, "Moved Stew");

    let res = app.send("GET", &url, Some(&app.auth(&admin)), None).await;
    assert_eq!(json(&res)["user"], other.id);

    let res = app.send("DELETE", &url, Some(&app.auth(&admin)), None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(app.repo.find_recipe(None, id).await.unwrap().is_none());
}

#[tokio::test]
async fn recipe_needs_existing_owner() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;

    let res = app
        .send(
            "POST",
            "/api/admin/recipes/",
            Some(&app.auth(&admin)),
            Some(json!({ "user": 999, "title": "Stew", "time_minutes": 40, "price": "7.25" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&res),
        json!({ "user": ["Invalid pk \"999\" - object does not exist."] })
    );
    assert!(app.repo.list_recipes(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn superuser_manages_tags_for_any_owner() {
    let app = TestApp::new();
    let admin = app
        .create_superuser("TestAdmin@example.com", "Sample189*")
        .await;
    let user = app.create_user("user@example.com", "AnyTEst3454").await;

    let res = app
        .send(
            "POST",
            "/api/admin/tags/",
            Some(&app.auth(&admin)),
            Some(json!({ "user": user.id, "name": " Vegan " })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = json(&res);
    assert_eq!(body["name"], "Vegan");
    let id = body["id"].as_i64().unwrap() as i32;

    let res = app
        .send("GET", "/api/recipe/tags/", Some(&app.auth(&user)), None)
        .await;
    assert_eq!(json(&res), json!([{ "id": id, "name": "Vegan" }]));

    let url = format!("/api/admin/tags/{id}/");
    let res = app
        .send(
            "PUT",
            &url,
            Some(&app.auth(&admin)),
            Some(json!({ "user": user.id, "name": "Vegetarian" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(&res)["name"], "Vegetarian");

    let res = app.send("DELETE", &url, Some(&app.auth(&admin)), None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = app.send("GET", &url, Some(&app.auth(&admin)), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn staff_cannot_change_recipes_or_tags() {
    let app = TestApp::new();
    let mut staff = app.create_user("staff@example.com", "AnyTEst3454").await;
    staff.is_staff = true;
    let staff = app.repo.save_user(&staff).await.unwrap();
    let tag = app.repo.insert_tag(staff.id, "Mine").await.unwrap();

    let res = app
        .send(
            "POST",
            "/api/admin/tags/",
            Some(&app.auth(&staff)),
            Some(json!({ "user": staff.id, "name": "Other" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(
            "DELETE",
            &format!("/api/admin/tags/{}/", tag.id),
            Some(&app.auth(&staff)),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(
            "GET",
            &format!("/api/admin/tags/{}/", tag.id),
            Some(&app.auth(&staff)),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}
