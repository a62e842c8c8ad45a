//! Tests against a live backend.
//!
//! Set `YOUNIVERSE_URL`, `YOUNIVERSE_API_KEY` and optionally
//! `YOUNIVERSE_ACCESS_TOKEN` / `YOUNIVERSE_USER_ID` (a `.env` file works),
//! then run with `--ignored`.

use std::env;

use youniverse::{views::StudentFilter, YouniverseClient};

fn live_client() -> Option<YouniverseClient> {
    dotenv::dotenv().ok();
    let url = env::var("YOUNIVERSE_URL").ok()?;
    let key = env::var("YOUNIVERSE_API_KEY").ok()?;

    let mut builder = YouniverseClient::builder().project_url(url).api_key(key);
    if let (Ok(token), Ok(user)) = (
        env::var("YOUNIVERSE_ACCESS_TOKEN"),
        env::var("YOUNIVERSE_USER_ID"),
    ) {
        builder = builder.auth(token, user);
    }
    Some(builder.build().expect("client should build"))
}

#[tokio::test]
#[ignore]
async fn live_feed_threads_are_consistent() {
    let Some(client) = live_client() else {
        eprintln!("YOUNIVERSE_URL not set, skipping");
        return;
    };

    let feed = client.posts().feed().limit(10).send().await.unwrap();
    for post in &feed {
        for thread in &post.comments {
            assert_eq!(thread.comment.comment.post_id, post.post.id);
            assert!(thread.comment.comment.parent_comment_id.is_none());
            for reply in &thread.replies {
                assert_eq!(
                    reply.comment.parent_comment_id.as_ref(),
                    Some(&thread.comment.comment.id)
                );
            }
        }
    }
}

#[tokio::test]
#[ignore]
async fn live_student_search() {
    let Some(client) = live_client() else {
        eprintln!("YOUNIVERSE_URL not set, skipping");
        return;
    };

    let result = client
        .profiles()
        .search(StudentFilter::new())
        .page(1)
        .per_page(5)
        .send()
        .await
        .unwrap();
    assert!(result.students.len() <= 5);
}

#[tokio::test]
#[ignore]
async fn live_chats_one_per_partner() {
    let Some(client) = live_client() else {
        eprintln!("YOUNIVERSE_URL not set, skipping");
        return;
    };
    if !client.is_authenticated() {
        eprintln!("no access token, skipping");
        return;
    }

    let result = client.messages().chats().await.unwrap();
    let mut partners: Vec<_> = result.chats.iter().map(|c| c.partner_id.clone()).collect();
    let total = partners.len();
    partners.sort();
    partners.dedup();
    assert_eq!(partners.len(), total);
}
