//! Integration tests for the localized marketing content tables.

use std::str::FromStr;

use db::models::{
    faq::{CreateFaq, Faq},
    service_offering::{CreateServiceOffering, ServiceOffering, UpdateServiceOffering},
    translation::{CreateTranslation, Translation},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use tempfile::TempDir;

async fn setup_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.to_string_lossy()))
            .expect("Invalid database URL")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

fn service(lang: &str, slug: &str, position: i64, is_published: bool) -> CreateServiceOffering {
    CreateServiceOffering {
        lang: lang.to_string(),
        slug: slug.to_string(),
        title: slug.replace('-', " "),
        description: format!("About {slug}"),
        icon: None,
        price_from: Some(800.0),
        position,
        is_published,
    }
}

#[tokio::test]
async fn published_services_are_filtered_by_language_and_ordered() {
    let (pool, _dir) = setup_test_pool().await;
    ServiceOffering::create(&pool, &service("en", "web-apps", 2, true))
        .await
        .unwrap();
    ServiceOffering::create(&pool, &service("en", "landing-pages", 1, true))
        .await
        .unwrap();
    ServiceOffering::create(&pool, &service("en", "drafts", 0, false))
        .await
        .unwrap();
    ServiceOffering::create(&pool, &service("es", "web-apps", 0, true))
        .await
        .unwrap();

    let published = ServiceOffering::find_published(&pool, "en").await.unwrap();
    let slugs: Vec<_> = published.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec!["landing-pages", "web-apps"]);

    assert_eq!(ServiceOffering::find_all(&pool, Some("en")).await.unwrap().len(), 3);
    assert_eq!(ServiceOffering::find_all(&pool, None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn duplicate_slug_in_same_language_is_rejected() {
    let (pool, _dir) = setup_test_pool().await;
    ServiceOffering::create(&pool, &service("en", "seo", 0, true))
        .await
        .unwrap();
    let err = ServiceOffering::create(&pool, &service("en", "seo", 1, true))
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(_)));
}

#[tokio::test]
async fn unpublishing_a_service_hides_it() {
    let (pool, _dir) = setup_test_pool().await;
    let created = ServiceOffering::create(&pool, &service("en", "ecommerce", 0, true))
        .await
        .unwrap();

    ServiceOffering::update(
        &pool,
        created.id,
        &UpdateServiceOffering {
            is_published: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(ServiceOffering::find_published(&pool, "en").await.unwrap().is_empty());
}

#[tokio::test]
async fn faqs_are_scoped_per_language() {
    let (pool, _dir) = setup_test_pool().await;
    for (lang, question) in [("en", "How long?"), ("de", "Wie lange?")] {
        Faq::create(
            &pool,
            &CreateFaq {
                lang: lang.to_string(),
                question: question.to_string(),
                answer: "Four weeks".to_string(),
                position: 0,
            },
        )
        .await
        .unwrap();
    }

    let german = Faq::find_all(&pool, Some("de")).await.unwrap();
    assert_eq!(german.len(), 1);
    assert_eq!(german[0].question, "Wie lange?");
}

#[tokio::test]
async fn translation_upsert_overwrites_value_and_builds_dictionary() {
    let (pool, _dir) = setup_test_pool().await;
    let entry = |key: &str, value: &str| CreateTranslation {
        lang: "en".to_string(),
        key: key.to_string(),
        value: value.to_string(),
    };

    let first = Translation::upsert(&pool, &entry("hero.title", "Hello"))
        .await
        .unwrap();
    let saved = Translation::upsert_many(
        &pool,
        &[entry("hero.title", "We build websites"), entry("cta", "Get a quote")],
    )
    .await
    .unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].id, first.id);
    assert_eq!(Translation::find_all(&pool, Some("en")).await.unwrap().len(), 2);

    let dictionary = Translation::dictionary(&pool, "en").await.unwrap();
    assert_eq!(dictionary.get("hero.title").map(String::as_str), Some("We build websites"));
    assert_eq!(dictionary.get("cta").map(String::as_str), Some("Get a quote"));
    assert!(Translation::dictionary(&pool, "fr").await.unwrap().is_empty());
}
