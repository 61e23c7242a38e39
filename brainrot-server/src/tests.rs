#![cfg(test)]

use brainrot_api::{
    CommentDraft, CommentId, CommentPage, CommentSort, CommentStatus, CommentView,
    Error as ApiError, GameId, NewComment, PageRequest, Store, VoteCounts, VoteType, VoterId,
};
use brainrot_mock_store::MemoryStore;

use crate::{games::GameDirectory, services, Error};

fn games() -> GameDirectory {
    GameDirectory::builtin()
}

fn voter(ip: &str) -> VoterId {
    VoterId(ip.to_string())
}

fn payload(author: &str, email: &str, body: &str) -> NewComment {
    NewComment {
        game_id: GameId::homepage(),
        author: author.to_string(),
        email: email.to_string(),
        body: body.to_string(),
        parent_id: None,
    }
}

fn api_err<T: std::fmt::Debug>(res: Result<T, Error>) -> ApiError {
    match res {
        Err(Error::Api(err)) => err,
        other => panic!("expected an api error, got {other:?}"),
    }
}

async fn submit_ok(store: &mut MemoryStore, data: &NewComment) -> CommentView {
    services::submit_comment(store, &games(), Some(voter("9.9.9.9")), data)
        .await
        .expect("submitting comment")
}

async fn vote(store: &mut MemoryStore, id: CommentId, ip: &str, t: VoteType) -> VoteCounts {
    services::cast_vote(store, id, &voter(ip), t)
        .await
        .expect("casting vote")
}

async fn fetch(store: &mut MemoryStore, page: u32, limit: u32, sort: CommentSort) -> CommentPage {
    services::fetch_page(
        store,
        &games(),
        &PageRequest::new(GameId::homepage(), page, limit, sort),
    )
    .await
    .expect("fetching page")
}

async fn seed_top(store: &mut MemoryStore, n: usize) -> Vec<CommentId> {
    let mut ids = Vec::new();
    for i in 0..n {
        let view = submit_ok(
            store,
            &payload(
                &format!("Player {i}"),
                &format!("player{i}@example.com"),
                &format!("This is comment number {i}"),
            ),
        )
        .await;
        ids.push(view.id);
    }
    ids
}

#[tokio::test]
async fn submitting_returns_the_persisted_comment() {
    let mut store = MemoryStore::new();
    let view = submit_ok(&mut store, &payload("Al", "al@x.com", "Great game!!")).await;

    assert_eq!(view.author, "Al");
    assert_eq!(view.body, "Great game!!");
    assert_eq!(view.like_count, 0);
    assert_eq!(view.dislike_count, 0);
    assert_eq!(view.parent_id, None);

    let stored = store.test_comment(view.id).expect("stored comment");
    assert_eq!(stored.status, CommentStatus::Approved);
    assert_eq!(stored.email, "al@x.com");
    assert_eq!(stored.ip_address.as_deref(), Some("9.9.9.9"));
}

#[tokio::test]
async fn email_is_normalized_before_storage() {
    let mut store = MemoryStore::new();
    let view = submit_ok(&mut store, &payload("  Al  ", " AL@X.COM ", "  Great game!!  ")).await;

    let stored = store.test_comment(view.id).expect("stored comment");
    assert_eq!(stored.email, "al@x.com");
    // author and body are trimmed but case-preserved
    assert_eq!(stored.author, "Al");
    assert_eq!(stored.body, "Great game!!");
}

#[tokio::test]
async fn rejected_submission_writes_nothing() {
    let mut store = MemoryStore::new();

    let res = services::submit_comment(
        &mut store,
        &games(),
        None,
        &payload("Al", "al@x.com", "hi"),
    )
    .await;
    assert_eq!(api_err(res), ApiError::InvalidBody);

    let res = services::submit_comment(
        &mut store,
        &games(),
        None,
        &payload("A", "al@x.com", "Great game!!"),
    )
    .await;
    assert_eq!(api_err(res), ApiError::InvalidAuthor);

    let mut unknown_game = payload("Al", "al@x.com", "Great game!!");
    unknown_game.game_id = GameId(String::from("not-a-game"));
    let res = services::submit_comment(&mut store, &games(), None, &unknown_game).await;
    assert_eq!(
        api_err(res),
        ApiError::UnknownGame(GameId(String::from("not-a-game")))
    );

    assert_eq!(store.test_num_comments(), 0);
}

#[tokio::test]
async fn replies_cannot_nest() {
    let mut store = MemoryStore::new();
    let top = submit_ok(&mut store, &payload("Al", "al@x.com", "Great game!!")).await;

    let mut reply = payload("Bea", "bea@x.com", "Agreed, great one");
    reply.parent_id = Some(top.id.0);
    let reply = submit_ok(&mut store, &reply).await;
    assert_eq!(reply.parent_id, Some(top.id));

    // replying to a reply is rejected
    let mut nested = payload("Cy", "cy@x.com", "Replying deeper");
    nested.parent_id = Some(reply.id.0);
    let res = services::submit_comment(&mut store, &games(), None, &nested).await;
    assert_eq!(api_err(res), ApiError::UnknownParent(reply.id));

    // as is replying to a comment that does not exist
    let mut orphan = payload("Cy", "cy@x.com", "Replying to nothing");
    orphan.parent_id = Some(999);
    let res = services::submit_comment(&mut store, &games(), None, &orphan).await;
    assert_eq!(api_err(res), ApiError::UnknownParent(CommentId(999)));

    // or to a parent that lives on another game's page
    let mut cross = payload("Cy", "cy@x.com", "Crossing game pages");
    cross.game_id = GameId(String::from("2v2io"));
    cross.parent_id = Some(top.id.0);
    let res = services::submit_comment(&mut store, &games(), None, &cross).await;
    assert_eq!(api_err(res), ApiError::UnknownParent(top.id));
}

#[tokio::test]
async fn repeating_a_vote_toggles_it_off() {
    let mut store = MemoryStore::new();
    let comment = submit_ok(&mut store, &payload("Al", "al@x.com", "Great game!!")).await;

    let counts = vote(&mut store, comment.id, "1.2.3.4", VoteType::Like).await;
    assert_eq!(counts, VoteCounts { like: 1, dislike: 0 });

    let counts = vote(&mut store, comment.id, "1.2.3.4", VoteType::Like).await;
    assert_eq!(counts, VoteCounts { like: 0, dislike: 0 });

    let ledger = store
        .find_vote(comment.id, &voter("1.2.3.4"))
        .await
        .expect("reading ledger");
    assert_eq!(ledger, None);

    let stored = store.test_comment(comment.id).expect("stored comment");
    assert_eq!((stored.like_count, stored.dislike_count), (0, 0));
}

#[tokio::test]
async fn switching_a_vote_moves_the_count() {
    let mut store = MemoryStore::new();
    let comment = submit_ok(&mut store, &payload("Al", "al@x.com", "Great game!!")).await;

    vote(&mut store, comment.id, "1.2.3.4", VoteType::Like).await;
    let counts = vote(&mut store, comment.id, "1.2.3.4", VoteType::Dislike).await;
    assert_eq!(counts, VoteCounts { like: 0, dislike: 1 });

    let ledger = store
        .find_vote(comment.id, &voter("1.2.3.4"))
        .await
        .expect("reading ledger");
    assert_eq!(ledger, Some(VoteType::Dislike));
}

#[tokio::test]
async fn voting_on_a_missing_comment_mutates_nothing() {
    let mut store = MemoryStore::new();
    seed_top(&mut store, 1).await;

    let res = services::cast_vote(&mut store, CommentId(77), &voter("1.2.3.4"), VoteType::Like).await;
    assert_eq!(api_err(res), ApiError::CommentNotFound(CommentId(77)));
    assert_eq!(store.test_num_votes(), 0);
}

#[tokio::test]
async fn counters_always_match_the_ledger() {
    let mut store = MemoryStore::new();
    let ids = seed_top(&mut store, 2).await;

    // a pile of toggles, switches and votes from different voters
    vote(&mut store, ids[0], "1.1.1.1", VoteType::Like).await;
    vote(&mut store, ids[0], "2.2.2.2", VoteType::Like).await;
    vote(&mut store, ids[0], "3.3.3.3", VoteType::Dislike).await;
    vote(&mut store, ids[0], "1.1.1.1", VoteType::Dislike).await;
    vote(&mut store, ids[0], "2.2.2.2", VoteType::Like).await;
    vote(&mut store, ids[1], "1.1.1.1", VoteType::Like).await;
    vote(&mut store, ids[1], "1.1.1.1", VoteType::Like).await;

    for id in ids {
        let recount = store.count_votes(id).await.expect("recounting");
        let stored = store.test_comment(id).expect("stored comment");
        assert_eq!(stored.like_count, recount.like);
        assert_eq!(stored.dislike_count, recount.dislike);
    }
}

#[tokio::test]
async fn pages_partition_the_approved_set() {
    let mut store = MemoryStore::new();
    let ids = seed_top(&mut store, 12).await;

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = fetch(&mut store, page, 5, CommentSort::Newest).await;
        assert_eq!(result.pagination.total, 12);
        assert_eq!(result.pagination.total_pages, 3);
        assert_eq!(result.comments.len(), if page == 3 { 2 } else { 5 });
        seen.extend(result.comments.iter().map(|c| c.id));
    }

    // newest-first is id-descending here since seeded timestamps increase
    let mut expected: Vec<CommentId> = ids;
    expected.reverse();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn an_empty_game_has_zero_pages() {
    let mut store = MemoryStore::new();
    let result = fetch(&mut store, 1, 5, CommentSort::Newest).await;
    assert!(result.comments.is_empty());
    assert_eq!(result.pagination.total, 0);
    assert_eq!(result.pagination.total_pages, 0);
}

#[tokio::test]
async fn replies_stay_on_their_page() {
    let mut store = MemoryStore::new();
    let ids = seed_top(&mut store, 6).await;

    let mut early = payload("Bea", "bea@x.com", "Reply to the first");
    early.parent_id = Some(ids[0].0);
    let early = submit_ok(&mut store, &early).await;
    let mut late = payload("Cy", "cy@x.com", "Reply to the last");
    late.parent_id = Some(ids[5].0);
    let late = submit_ok(&mut store, &late).await;

    let page1 = fetch(&mut store, 1, 5, CommentSort::Oldest).await;
    assert_eq!(page1.comments[0].replies.len(), 1);
    assert_eq!(page1.comments[0].replies[0].id, early.id);
    // no reply of an off-page parent leaks in
    assert!(page1
        .comments
        .iter()
        .all(|c| c.replies.iter().all(|r| r.id != late.id)));

    let page2 = fetch(&mut store, 2, 5, CommentSort::Oldest).await;
    assert_eq!(page2.comments.len(), 1);
    assert_eq!(page2.comments[0].id, ids[5]);
    assert_eq!(page2.comments[0].replies[0].id, late.id);
}

#[tokio::test]
async fn replies_come_back_oldest_first() {
    let mut store = MemoryStore::new();
    let ids = seed_top(&mut store, 1).await;

    let mut reply_ids = Vec::new();
    for i in 0..3 {
        let mut reply = payload("Bea", "bea@x.com", &format!("Reply number {i}"));
        reply.parent_id = Some(ids[0].0);
        reply_ids.push(submit_ok(&mut store, &reply).await.id);
    }

    let page = fetch(&mut store, 1, 5, CommentSort::Newest).await;
    let replies: Vec<CommentId> = page.comments[0].replies.iter().map(|r| r.id).collect();
    assert_eq!(replies, reply_ids);
}

#[tokio::test]
async fn popular_sort_orders_by_like_count() {
    let mut store = MemoryStore::new();
    let ids = seed_top(&mut store, 3).await;

    vote(&mut store, ids[1], "1.1.1.1", VoteType::Like).await;
    vote(&mut store, ids[1], "2.2.2.2", VoteType::Like).await;
    vote(&mut store, ids[2], "1.1.1.1", VoteType::Like).await;

    let page = fetch(&mut store, 1, 5, CommentSort::Popular).await;
    let order: Vec<CommentId> = page.comments.iter().map(|c| c.id).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
    assert_eq!(page.comments[0].like_count, 2);
}

#[tokio::test]
async fn fetching_an_unknown_game_is_rejected() {
    let mut store = MemoryStore::new();
    let res = services::fetch_page(
        &mut store,
        &games(),
        &PageRequest::new(GameId(String::from("not-a-game")), 1, 5, CommentSort::Newest),
    )
    .await;
    assert_eq!(
        api_err(res),
        ApiError::UnknownGame(GameId(String::from("not-a-game")))
    );
}

#[tokio::test]
async fn oversized_limits_are_clamped() {
    let mut store = MemoryStore::new();
    seed_top(&mut store, 25).await;

    let page = fetch(&mut store, 1, 100, CommentSort::Newest).await;
    assert_eq!(page.pagination.limit, 20);
    assert_eq!(page.comments.len(), 20);
}

#[tokio::test]
async fn only_approved_comments_are_visible() {
    let mut store = MemoryStore::new();
    seed_top(&mut store, 1).await;
    store
        .insert_comment(CommentDraft {
            game_id: GameId::homepage(),
            parent_id: None,
            author: String::from("Mod"),
            email: String::from("mod@x.com"),
            body: String::from("Awaiting moderation"),
            status: CommentStatus::Pending,
            ip_address: None,
        })
        .await
        .expect("inserting pending comment");

    let page = fetch(&mut store, 1, 5, CommentSort::Newest).await;
    assert_eq!(page.comments.len(), 1);
    assert_eq!(page.pagination.total, 1);
}
