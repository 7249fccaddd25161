//! Integration tests for the hotel picture routes.

mod common;

use common::{upload, TestHarness, JPEG, PNG, WEBP};
use hotelier_core::ordering::is_contiguous;
use serde_json::Value;

#[tokio::test]
async fn upload_returns_created_picture() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Upload Hotel");
    let client = reqwest::Client::new();

    let resp = upload(&client, addr, hotel_id, PNG, "front.png", "image/png").await;
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["hotel_id"], hotel_id.get());
    assert_eq!(body["position"], 1);
    assert_eq!(body["filesize"], PNG.len());
    let filepath = body["filepath"].as_str().unwrap();
    assert!(filepath.starts_with("pictures/"));
    assert!(filepath.ends_with(".png"));
    assert_eq!(body["url"], format!("/storage/{filepath}"));
    assert_eq!(std::fs::read(h.blob_path(filepath)).unwrap(), PNG);
}

#[tokio::test]
async fn uploaded_file_is_served() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Served");
    let client = reqwest::Client::new();

    let body: Value = upload(&client, addr, hotel_id, JPEG, "a.jpg", "image/jpeg")
        .await
        .json()
        .await
        .unwrap();
    let url = body["url"].as_str().unwrap();

    let resp = client.get(format!("http://{addr}{url}")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(&resp.bytes().await.unwrap()[..], JPEG);
}

#[tokio::test]
async fn upload_appends_after_existing() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Append");
    let client = reqwest::Client::new();

    upload(&client, addr, hotel_id, PNG, "1.png", "image/png").await;
    upload(&client, addr, hotel_id, JPEG, "2.jpg", "image/jpeg").await;
    let third: Value = upload(&client, addr, hotel_id, WEBP, "3.webp", "image/webp")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(third["position"], 3);
    assert_eq!(h.positions(hotel_id), vec![1, 2, 3]);
}

#[tokio::test]
async fn upload_without_picture_field_is_400() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("No file");

    let form = reqwest::multipart::Form::new().text("caption", "hello");
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/hotels/{hotel_id}/pictures"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn upload_of_unsupported_type_is_422() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Gif");
    let client = reqwest::Client::new();

    let resp = upload(&client, addr, hotel_id, b"GIF89a\x01\0\x01\0", "a.gif", "image/gif").await;
    assert_eq!(resp.status(), 422);

    let resp = upload(&client, addr, hotel_id, b"not an image", "a.png", "image/png").await;
    assert_eq!(resp.status(), 422);

    // Declared type disagrees with the content.
    let resp = upload(&client, addr, hotel_id, PNG, "a.jpg", "image/jpeg").await;
    assert_eq!(resp.status(), 422);

    assert!(h.positions(hotel_id).is_empty());
    let stored = std::fs::read_dir(h.blob_path("pictures"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn upload_over_size_limit_is_422() {
    let mut config = hotelier_core::config::Config::default();
    config.storage.max_upload_bytes = 16;
    let (h, addr) = TestHarness::with_server_config(config).await;
    let hotel_id = h.create_hotel("Small");
    let client = reqwest::Client::new();

    let exact: &'static [u8] = &PNG[..16];
    let resp = upload(&client, addr, hotel_id, exact, "ok.png", "image/png").await;
    assert_eq!(resp.status(), 201);

    let resp = upload(&client, addr, hotel_id, JPEG, "big.jpg", "image/jpeg").await;
    assert_eq!(resp.status(), 422);
    assert_eq!(h.positions(hotel_id), vec![1]);
}

#[tokio::test]
async fn upload_to_unknown_hotel_is_404() {
    let (_h, addr) = TestHarness::with_server().await;
    let resp = upload(
        &reqwest::Client::new(),
        addr,
        hotelier_core::HotelId::from(4242),
        PNG,
        "a.png",
        "image/png",
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn concurrent_uploads_get_contiguous_positions() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Busy");
    let client = reqwest::Client::new();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                upload(&client, addr, hotel_id, PNG, &format!("{i}.png"), "image/png")
                    .await
                    .status()
            })
        })
        .collect();
    for t in tasks {
        assert_eq!(t.await.unwrap(), 201);
    }

    let mut positions = h.positions(hotel_id);
    positions.sort_unstable();
    assert_eq!(positions, (1..=8).collect::<Vec<_>>());
}

#[tokio::test]
async fn list_returns_display_order() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("List");
    let client = reqwest::Client::new();
    upload(&client, addr, hotel_id, PNG, "a.png", "image/png").await;
    upload(&client, addr, hotel_id, JPEG, "b.jpg", "image/jpeg").await;

    let resp = client
        .get(format!("http://{addr}/api/hotels/{hotel_id}/pictures"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Vec<Value> = resp.json().await.unwrap();
    let positions: Vec<i64> = body.iter().map(|p| p["position"].as_i64().unwrap()).collect();
    assert_eq!(positions, vec![1, 2]);

    let resp = client
        .get(format!("http://{addr}/api/hotels/999/pictures"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn delete_removes_file_and_compacts() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Delete");
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    let mut paths = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        let body: Value = upload(&client, addr, hotel_id, PNG, name, "image/png")
            .await
            .json()
            .await
            .unwrap();
        ids.push(body["id"].as_i64().unwrap());
        paths.push(body["filepath"].as_str().unwrap().to_string());
    }

    let resp = client
        .delete(format!("http://{addr}/api/hotels/{hotel_id}/pictures/{}", ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    assert!(!h.blob_path(&paths[0]).exists());
    assert!(h.blob_path(&paths[1]).exists());
    assert_eq!(h.positions(hotel_id), vec![1, 2]);
    assert!(is_contiguous(&h.positions(hotel_id)));

    // Gone now, so no longer owned.
    let resp = client
        .delete(format!("http://{addr}/api/hotels/{hotel_id}/pictures/{}", ids[0]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn delete_succeeds_when_file_already_missing() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Missing file");
    let client = reqwest::Client::new();

    let body: Value = upload(&client, addr, hotel_id, PNG, "a.png", "image/png")
        .await
        .json()
        .await
        .unwrap();
    std::fs::remove_file(h.blob_path(body["filepath"].as_str().unwrap())).unwrap();

    let resp = client
        .delete(format!("http://{addr}/api/hotels/{hotel_id}/pictures/{}", body["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert!(h.positions(hotel_id).is_empty());
}

#[tokio::test]
async fn delete_of_other_hotels_picture_is_403() {
    let (h, addr) = TestHarness::with_server().await;
    let mine = h.create_hotel("Mine");
    let theirs = h.create_hotel("Theirs");
    let client = reqwest::Client::new();

    let body: Value = upload(&client, addr, theirs, PNG, "a.png", "image/png")
        .await
        .json()
        .await
        .unwrap();

    let resp = client
        .delete(format!("http://{addr}/api/hotels/{mine}/pictures/{}", body["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["code"], "forbidden");

    assert!(h.blob_path(body["filepath"].as_str().unwrap()).exists());
    assert_eq!(h.positions(theirs), vec![1]);
}

#[tokio::test]
async fn reorder_applies_permutation() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Reorder");
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for name in ["1.png", "2.png", "3.png"] {
        let body: Value = upload(&client, addr, hotel_id, PNG, name, "image/png")
            .await
            .json()
            .await
            .unwrap();
        ids.push(body["id"].as_i64().unwrap());
    }

    let resp = client
        .patch(format!("http://{addr}/api/hotels/{hotel_id}/pictures/reorder"))
        .json(&serde_json::json!({ "picture_ids": [ids[2], ids[0], ids[1]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let listed: Vec<Value> = client
        .get(format!("http://{addr}/api/hotels/{hotel_id}/pictures"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order: Vec<i64> = listed.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
}

#[tokio::test]
async fn reorder_rejects_wrong_sets_without_changes() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Strict");
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for name in ["1.png", "2.png", "3.png"] {
        let body: Value = upload(&client, addr, hotel_id, PNG, name, "image/png")
            .await
            .json()
            .await
            .unwrap();
        ids.push(body["id"].as_i64().unwrap());
    }
    let url = format!("http://{addr}/api/hotels/{hotel_id}/pictures/reorder");

    for (picture_ids, status) in [
        (serde_json::json!([ids[2], ids[0]]), 403),
        (serde_json::json!([ids[2], ids[0], ids[1], 99]), 403),
        (serde_json::json!([ids[0], ids[0], ids[1]]), 422),
    ] {
        let resp = client
            .patch(&url)
            .json(&serde_json::json!({ "picture_ids": picture_ids }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), status);
    }

    let resp = client
        .patch(&url)
        .json(&serde_json::json!({ "picture_ids": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let listed = hotelier_db::queries::pictures::list_picture_ids(&h.conn(), hotel_id).unwrap();
    let listed: Vec<i64> = listed.iter().map(|id| id.get()).collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn empty_reorder_on_empty_hotel_is_ok() {
    let (h, addr) = TestHarness::with_server().await;
    let hotel_id = h.create_hotel("Empty");

    let resp = reqwest::Client::new()
        .patch(format!("http://{addr}/api/hotels/{hotel_id}/pictures/reorder"))
        .json(&serde_json::json!({ "picture_ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}
