use async_graphql::Request;
use foodshare::db::models::Role;
use foodshare::db::users::{self, NewUser};
use foodshare::db;
use foodshare::extractors::CurrentUser;
use foodshare::graphql::{build_schema, AdminAccess, FoodShareSchema};
use foodshare::state::DbPool;
use serde_json::Value;
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    pool: DbPool,
    schema: FoodShareSchema,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::create_pool(&dir.path().join("test.db")).expect("create pool");
        db::run_migrations(&pool).expect("run migrations");
        Self {
            _dir: dir,
            pool,
            schema: build_schema(),
        }
    }

    fn user(&self, name: &str, email: &str, role: Role) -> CurrentUser {
        let conn = self.pool.get().unwrap();
        users::ensure_user(
            &conn,
            &NewUser {
                name: name.into(),
                email: email.into(),
                picture: String::new(),
            },
            role,
        )
        .unwrap()
        .into()
    }

    async fn run(&self, query: &str, user: Option<&CurrentUser>) -> Result<Value, Vec<String>> {
        let mut request = Request::new(query).data(self.pool.clone());
        if let Some(user) = user {
            if user.role == Role::Admin {
                request = request.data(AdminAccess);
            }
            request = request.data(user.clone());
        }

        let response = self.schema.execute(request).await;
        if response.errors.is_empty() {
            Ok(response.data.into_json().unwrap())
        } else {
            Err(response.errors.into_iter().map(|e| e.message).collect())
        }
    }

    async fn ok(&self, query: &str, user: Option<&CurrentUser>) -> Value {
        self.run(query, user)
            .await
            .unwrap_or_else(|e| panic!("query failed: {e:?}\n{query}"))
    }

    async fn err(&self, query: &str, user: Option<&CurrentUser>) -> String {
        match self.run(query, user).await {
            Ok(data) => panic!("expected an error, got {data}"),
            Err(errors) => errors.join("; "),
        }
    }
}

#[tokio::test]
async fn add_donation_applies_defaults_and_records_owner() {
    let h = Harness::new();
    let donor = h.user("Asha", "asha@example.org", Role::User);

    let data = h
        .ok(
            r#"mutation {
                addDonation(input: { foodName: "Rice", description: "5kg bag" }) {
                    id foodName quantity category status userId location
                }
            }"#,
            Some(&donor),
        )
        .await;

    let donation = &data["addDonation"];
    assert_eq!(donation["quantity"], 1);
    assert_eq!(donation["category"], "Other");
    assert_eq!(donation["status"], "AVAILABLE");
    assert_eq!(donation["location"], "");
    assert_eq!(donation["userId"], donor.uid.as_str());

    let anonymous = h
        .ok(
            r#"mutation { addDonation(input: { foodName: "Bread" }) { userId } }"#,
            None,
        )
        .await;
    assert_eq!(anonymous["addDonation"]["userId"], Value::Null);
}

#[tokio::test]
async fn donation_queries_filter_and_summarise() {
    let h = Harness::new();
    let donor = h.user("Asha", "asha@example.org", Role::User);

    for (food, category, location) in [
        ("Apples", "Fruits", "Koramangala"),
        ("Rice", "Grains", ""),
        ("Pears", "Fruits", "Koramangala"),
    ] {
        h.ok(
            &format!(
                r#"mutation {{ addDonation(input: {{ foodName: "{food}", category: "{category}", location: "{location}" }}) {{ id }} }}"#
            ),
            Some(&donor),
        )
        .await;
    }

    let data = h
        .ok(
            &format!(
                r#"{{
                    fruits: donationsByCategory(category: "Fruits") {{ foodName }}
                    all: donationsByCategory(category: "All") {{ foodName }}
                    located: donationsWithLocation {{ foodName }}
                    mine: userDonations(userId: "{}") {{ foodName }}
                    nobody: userDonations {{ foodName }}
                    donationStats {{
                        totalDonations
                        categoryCounts {{ key count }}
                        locationCounts {{ key count }}
                        recentDonations {{ foodName }}
                    }}
                }}"#,
                donor.uid
            ),
            None,
        )
        .await;

    assert_eq!(data["fruits"].as_array().unwrap().len(), 2);
    assert_eq!(data["fruits"][0]["foodName"], "Pears");
    assert_eq!(data["all"].as_array().unwrap().len(), 3);
    assert_eq!(data["located"].as_array().unwrap().len(), 2);
    assert_eq!(data["mine"].as_array().unwrap().len(), 3);
    assert!(data["nobody"].as_array().unwrap().is_empty());

    let stats = &data["donationStats"];
    assert_eq!(stats["totalDonations"], 3);
    let fruits = stats["categoryCounts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["key"] == "Fruits")
        .unwrap();
    assert_eq!(fruits["count"], 2);
    assert_eq!(stats["locationCounts"].as_array().unwrap().len(), 1);
    assert_eq!(stats["recentDonations"][0]["foodName"], "Pears");
}

#[tokio::test]
async fn money_donations_are_validated_and_totalled() {
    let h = Harness::new();

    let err = h
        .err(
            r#"mutation { createMoneyDonation(input: { donorName: "Ravi", donationAmount: 0 }) { id } }"#,
            None,
        )
        .await;
    assert!(err.contains("greater than zero"), "{err}");

    for amount in ["10.5", "4.5"] {
        h.ok(
            &format!(
                r#"mutation {{ createMoneyDonation(input: {{ donorName: "Ravi", donationAmount: {amount}, transactionId: "tx" }}) {{ id }} }}"#
            ),
            None,
        )
        .await;
    }

    let data = h
        .ok(
            "{ globalStats { totalDonations totalMoneyAmount allMoneyDonations { donorName } } }",
            None,
        )
        .await;
    assert_eq!(data["globalStats"]["totalMoneyAmount"], 15.0);
    assert_eq!(data["globalStats"]["totalDonations"], 0);
    assert_eq!(
        data["globalStats"]["allMoneyDonations"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn food_request_lifecycle_is_admin_only_and_forward_only() {
    let h = Harness::new();
    let admin = h.user("Boss", "boss@example.org", Role::Admin);
    let user = h.user("Asha", "asha@example.org", Role::User);

    let data = h
        .ok(
            r#"mutation {
                createFoodRequest(input: {
                    name: "Shelter", contact: "555-0100", location: "Main St",
                    foodDescription: "Bread", quantity: 4, latitude: 12.9, longitude: 77.6
                }) { id status }
            }"#,
            None,
        )
        .await;
    let id = data["createFoodRequest"]["id"].as_str().unwrap().to_string();
    assert_eq!(data["createFoodRequest"]["status"], "PENDING");

    let bad_quantity = h
        .err(
            r#"mutation {
                createFoodRequest(input: {
                    name: "Shelter", contact: "555", location: "Main St",
                    foodDescription: "Bread", quantity: 0
                }) { id }
            }"#,
            None,
        )
        .await;
    assert!(bad_quantity.contains("positive"), "{bad_quantity}");

    let approve = format!(
        r#"mutation {{ updateFoodRequestStatus(id: "{id}", status: APPROVED) {{ status }} }}"#
    );
    let denied = h.err(&approve, Some(&user)).await;
    assert!(denied.contains("Admin access required"), "{denied}");

    let data = h.ok(&approve, Some(&admin)).await;
    assert_eq!(data["updateFoodRequestStatus"]["status"], "APPROVED");

    let backwards = h
        .err(
            &format!(
                r#"mutation {{ updateFoodRequestStatus(id: "{id}", status: PENDING) {{ status }} }}"#
            ),
            Some(&admin),
        )
        .await;
    assert!(
        backwards.contains("from approved to pending"),
        "{backwards}"
    );

    let data = h
        .ok(
            &format!(r#"mutation {{ deleteFoodRequest(id: "{id}") }}"#),
            Some(&admin),
        )
        .await;
    assert_eq!(data["deleteFoodRequest"], true);
    let data = h.ok("{ foodRequests { id } }", None).await;
    assert!(data["foodRequests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn user_lookup_and_admin_listing() {
    let h = Harness::new();
    let admin = h.user("Boss", "boss@example.org", Role::Admin);
    let user = h.user("Asha", "asha@example.org", Role::User);

    let data = h
        .ok(
            r#"{
                found: user(email: "asha@example.org") { name role }
                missing: user(email: "nobody@example.org") { name }
                none: user { name }
            }"#,
            None,
        )
        .await;
    assert_eq!(data["found"]["name"], "Asha");
    assert_eq!(data["found"]["role"], "USER");
    assert_eq!(data["missing"], Value::Null);
    assert_eq!(data["none"], Value::Null);

    let data = h.ok("{ me { email } }", Some(&user)).await;
    assert_eq!(data["me"]["email"], "asha@example.org");
    let data = h.ok("{ me { email } }", None).await;
    assert_eq!(data["me"], Value::Null);

    h.err("{ users { email } }", Some(&user)).await;
    let data = h.ok("{ users { email } }", Some(&admin)).await;
    assert_eq!(data["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn feed_mutations_require_login() {
    let h = Harness::new();
    let err = h
        .err(
            r#"mutation { createPost(input: { title: "Hi", content: "Fresh bread" }) { id } }"#,
            None,
        )
        .await;
    assert!(err.contains("Authentication required"), "{err}");
}

#[tokio::test]
async fn posts_likes_and_comments() {
    let h = Harness::new();
    let author = h.user("Asha", "asha@example.org", Role::User);
    let reader = h.user("Ravi", "ravi@example.org", Role::User);

    let data = h
        .ok(
            r#"mutation {
                createPost(input: { title: "Surplus", content: "10 loaves", imageUrl: "" }) {
                    id likes imageUrl userName userId
                }
            }"#,
            Some(&author),
        )
        .await;
    let post = &data["createPost"];
    let post_id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["likes"], 0);
    assert_eq!(post["imageUrl"], Value::Null);
    assert_eq!(post["userName"], "Asha");
    assert_eq!(post["userId"], author.uid.as_str());

    let like = format!(r#"mutation {{ likePost(id: "{post_id}") {{ success liked likes }} }}"#);
    let data = h.ok(&like, Some(&reader)).await;
    assert_eq!(data["likePost"]["liked"], true);
    assert_eq!(data["likePost"]["likes"], 1);

    let data = h.ok("{ userLikes }", Some(&reader)).await;
    assert_eq!(data["userLikes"][0], post_id.as_str());
    let data = h
        .ok(
            &format!(r#"{{ userLikes(userId: "{}", skip: true) }}"#, reader.uid),
            None,
        )
        .await;
    assert!(data["userLikes"].as_array().unwrap().is_empty());

    let data = h.ok(&like, Some(&reader)).await;
    assert_eq!(data["likePost"]["liked"], false);
    assert_eq!(data["likePost"]["likes"], 0);

    let missing = h
        .err(r#"mutation { likePost(id: "nope") { likes } }"#, Some(&reader))
        .await;
    assert!(missing.contains("Post not found"), "{missing}");

    let data = h
        .ok(
            &format!(
                r#"mutation {{ addComment(postId: "{post_id}", content: "Can I pick up?") {{ id userName }} }}"#
            ),
            Some(&reader),
        )
        .await;
    let comment_id = data["addComment"]["id"].as_str().unwrap().to_string();
    assert_eq!(data["addComment"]["userName"], "Ravi");

    let data = h
        .ok(
            &format!(
                r#"{{ comments(postId: "{post_id}") {{ content }} commentCount(postId: "{post_id}") }}"#
            ),
            None,
        )
        .await;
    assert_eq!(data["commentCount"], 1);
    assert_eq!(data["comments"][0]["content"], "Can I pick up?");

    let not_yours = h
        .err(
            &format!(r#"mutation {{ deleteComment(id: "{comment_id}") }}"#),
            Some(&author),
        )
        .await;
    assert!(
        not_yours.contains("You can only delete your own comments"),
        "{not_yours}"
    );

    let not_yours = h
        .err(
            &format!(r#"mutation {{ deletePost(id: "{post_id}") }}"#),
            Some(&reader),
        )
        .await;
    assert!(
        not_yours.contains("You can only delete your own posts"),
        "{not_yours}"
    );

    let data = h
        .ok(
            &format!(r#"mutation {{ deletePost(id: "{post_id}") }}"#),
            Some(&author),
        )
        .await;
    assert_eq!(data["deletePost"], true);

    let data = h
        .ok(
            &format!(r#"{{ post(id: "{post_id}") {{ id }} commentCount(postId: "{post_id}") }}"#),
            None,
        )
        .await;
    assert_eq!(data["post"], Value::Null);
    assert_eq!(data["commentCount"], 0);

    let orphan = h
        .err(
            &format!(r#"mutation {{ addComment(postId: "{post_id}", content: "late") {{ id }} }}"#),
            Some(&reader),
        )
        .await;
    assert!(orphan.contains("Post not found"), "{orphan}");
}
