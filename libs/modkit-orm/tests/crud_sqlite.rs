#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Log, User, sqlite, users};
use modkit_orm::{ColOp, Condition, Orm, OrmError, Params, ReadOptions};
use sea_orm::{ConnectionTrait, DbBackend, Statement};

#[tokio::test]
async fn insert_read_update_delete_round_trip() {
    let db = sqlite().await;
    let orm = Orm::new(&db);

    let mut user = User::new("ann", 31);
    user.tags = vec!["admin".to_owned()];
    let id = orm.insert(&user).await.unwrap();
    assert_eq!(id, 1);

    let mut loaded = User {
        id: 1,
        ..User::default()
    };
    orm.read(&mut loaded).await.unwrap();
    assert_eq!(loaded.name, "ann");
    assert_eq!(loaded.age, 31);
    assert_eq!(loaded.tags, vec!["admin".to_owned()]);

    loaded.age = 32;
    loaded.name = "not written".to_owned();
    assert_eq!(orm.update(&loaded, &["age"]).await.unwrap(), 1);

    let mut again = User {
        id: 1,
        ..User::default()
    };
    orm.read(&mut again).await.unwrap();
    assert_eq!(again.age, 32);
    assert_eq!(again.name, "ann");

    assert_eq!(orm.delete(&again, &[]).await.unwrap(), 1);
    let err = orm.read(&mut again).await.unwrap_err();
    assert!(matches!(err, OrmError::NotFound));
}

#[tokio::test]
async fn read_by_other_fields() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    orm.insert(&User::new("bob", 40)).await.unwrap();

    let mut user = User::new("bob", 0);
    orm.read_with(&mut user, &ReadOptions::by(&["name"]))
        .await
        .unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.age, 40);
}

#[tokio::test]
async fn unset_primary_key_is_rejected() {
    let db = sqlite().await;
    let orm = Orm::new(&db);

    let mut user = User::new("ghost", 1);
    assert!(matches!(
        orm.read(&mut user).await,
        Err(OrmError::MissingPrimaryKey)
    ));
    assert!(matches!(
        orm.update(&user, &[]).await,
        Err(OrmError::MissingPrimaryKey)
    ));
    assert!(matches!(
        orm.delete(&user, &[]).await,
        Err(OrmError::MissingPrimaryKey)
    ));
}

#[tokio::test]
async fn omit_empty_json_is_stored_as_empty_text() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    orm.insert(&User::new("plain", 5)).await.unwrap();

    let row = db
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT tags FROM user WHERE id = 1",
        ))
        .await
        .unwrap()
        .unwrap();
    let raw: String = row.try_get("", "tags").unwrap();
    assert_eq!(raw, "");

    let mut loaded = User {
        id: 1,
        ..User::default()
    };
    orm.read(&mut loaded).await.unwrap();
    assert!(loaded.tags.is_empty());
}

#[tokio::test]
async fn multi_row_insert_in_chunks() {
    let db = sqlite().await;
    let orm = Orm::new(&db);

    let inserted = orm
        .insert_multi_with_bulk(&users(5), 2, None)
        .await
        .unwrap();
    assert_eq!(inserted, 5);
    assert_eq!(orm.query::<User>().count().await.unwrap(), 5);

    assert_eq!(orm.insert_multi::<User>(&[], None).await.unwrap(), 0);
}

#[tokio::test]
async fn conditions_filter_order_and_page() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    orm.insert_multi(&users(6), None).await.unwrap();

    let adults = orm
        .query::<User>()
        .filter("age__gte", 23)
        .order_by(["-age"])
        .all()
        .await
        .unwrap();
    let ages: Vec<i64> = adults.iter().map(|u| u.age).collect();
    assert_eq!(ages, vec![25, 24, 23]);

    let page = orm
        .query::<User>()
        .order_by(["age"])
        .limit(2)
        .offset(1)
        .all()
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].age, 21);

    let picked = orm
        .query::<User>()
        .filter_in("name", ["user-0", "user-5"])
        .count()
        .await
        .unwrap();
    assert_eq!(picked, 2);

    let cond = Condition::new()
        .and("name__startswith", "user-")
        .and_not("age", 20)
        .or("name", "nobody");
    let count = orm.query::<User>().set_cond(cond).count().await.unwrap();
    assert_eq!(count, 5);

    let first = orm
        .query::<User>()
        .filter("name__endswith", "-3")
        .one()
        .await
        .unwrap();
    assert_eq!(first.age, 23);
}

#[tokio::test]
async fn projected_reads_load_only_selected_fields() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    let mut tagged = users(3);
    for user in &mut tagged {
        user.tags = vec!["t".to_owned()];
    }
    orm.insert_multi(&tagged, None).await.unwrap();

    let rows = orm
        .query::<User>()
        .select(["id", "name"])
        .order_by(["id"])
        .all()
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["user-0", "user-1", "user-2"]);
    assert_eq!(rows[2].id, 3);
    assert!(rows.iter().all(|u| u.age == 0 && u.tags.is_empty()));

    let oldest = orm
        .query::<User>()
        .select(["age"])
        .order_by(["-age"])
        .one()
        .await
        .unwrap();
    assert_eq!(oldest, User::new("", 22));
}

#[tokio::test]
#[should_panic(expected = "has no field `missing`")]
async fn projection_rejects_unknown_fields() {
    let db = sqlite().await;
    Orm::new(&db)
        .query::<User>()
        .select(["missing"])
        .all()
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_in_matches_nothing() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    orm.insert_multi(&users(3), None).await.unwrap();

    let none: Vec<String> = Vec::new();
    let count = orm
        .query::<User>()
        .filter_in("name", none)
        .count()
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn one_without_match_is_not_found() {
    let db = sqlite().await;
    let orm = Orm::new(&db);

    let err = orm
        .query::<User>()
        .filter("name", "missing")
        .one()
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NotFound));
}

#[tokio::test]
async fn read_one_keeps_destination_on_miss() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    let desc = modkit_orm::descriptor_of::<User>();
    let qs = modkit_orm::QuerySetter::new();

    let mut dest = User::new("kept", 9);
    let err = desc
        .read_one(
            orm.executor(),
            &qs,
            &Condition::new().and("id", 42),
            &mut dest,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NotFound));
    assert_eq!(dest, User::new("kept", 9));
}

#[tokio::test]
#[should_panic(expected = "empty destination")]
async fn read_batch_requires_an_empty_destination() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    let desc = modkit_orm::descriptor_of::<User>();

    let mut dest = vec![User::default()];
    desc.read_batch(
        orm.executor(),
        &modkit_orm::QuerySetter::new(),
        &Condition::new(),
        &mut dest,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn batch_update_with_column_arithmetic() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    orm.insert_multi(&users(4), None).await.unwrap();

    let updated = orm
        .query::<User>()
        .filter("age__lt", 22)
        .update(&Params::new().col("age", ColOp::Add, 100))
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let renamed = orm
        .query::<User>()
        .filter("name", "user-3")
        .update(&Params::new().set("name", "renamed"))
        .await
        .unwrap();
    assert_eq!(renamed, 1);

    let high = orm
        .query::<User>()
        .filter("age__gt", 100)
        .count()
        .await
        .unwrap();
    assert_eq!(high, 2);
    assert_eq!(
        orm.query::<User>()
            .filter("name", "renamed")
            .count()
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn batch_delete() {
    let db = sqlite().await;
    let orm = Orm::new(&db);
    orm.insert_multi(&users(5), None).await.unwrap();

    let deleted = orm
        .query::<User>()
        .filter("name__contains", "-1")
        .delete()
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert_eq!(orm.query::<User>().delete().await.unwrap(), 4);
    assert_eq!(orm.query::<User>().count().await.unwrap(), 0);
}

#[tokio::test]
async fn sharded_tables_need_a_suffix() {
    let db = sqlite().await;
    let orm = Orm::new(&db);

    let unsuffixed = Log {
        id: 1,
        day: String::new(),
        msg: "lost".to_owned(),
    };
    assert!(matches!(
        orm.insert(&unsuffixed).await,
        Err(OrmError::MissingTableSuffix { .. })
    ));
    assert!(matches!(
        orm.query::<Log>().count().await,
        Err(OrmError::MissingTableSuffix { .. })
    ));

    let first = Log {
        id: 1,
        day: "20240101".to_owned(),
        msg: "first".to_owned(),
    };
    orm.insert(&first).await.unwrap();
    orm.insert_multi(
        &[Log {
            id: 7,
            day: String::new(),
            msg: "second".to_owned(),
        }],
        Some("20240102"),
    )
    .await
    .unwrap();

    let day_one = orm
        .query::<Log>()
        .table_suffix("20240101")
        .all()
        .await
        .unwrap();
    assert_eq!(day_one.len(), 1);
    assert_eq!(day_one[0].msg, "first");
    assert!(day_one[0].day.is_empty());

    let mut second = Log {
        id: 7,
        day: "20240102".to_owned(),
        msg: String::new(),
    };
    orm.read(&mut second).await.unwrap();
    assert_eq!(second.msg, "second");
    assert_eq!(second.day, "20240102");
}
