mod common;

use std::sync::{Arc, atomic::Ordering};

use common::{ScriptedClient, subtitles};
use videosum_core::{
    ArticlePipeline, ArticleProgress, ArticleRequest, ArticleStage, ArticleType, StopHandle,
    VideosumError,
};

fn request<'a>(
    ty: ArticleType,
    subs: &'a [videosum_core::Subtitle],
    custom: Option<&'a str>,
) -> ArticleRequest<'a> {
    ArticleRequest {
        article_type: ty,
        subtitles: subs,
        language: "en",
        chunk_duration: 300.0,
        custom_prompt: custom,
        generate_image: false,
    }
}

#[tokio::test]
async fn chunks_run_one_at_a_time_then_merge() {
    // three windows: [0, 100], [400], [800]
    let subs = subtitles(&[0.0, 100.0, 400.0, 800.0]);
    let client = Arc::new(ScriptedClient::replies(&["part A", "part B", "part C", "merged"]));
    let pipeline = ArticlePipeline::new(client.clone());

    let mut progress: Vec<ArticleProgress> = Vec::new();
    let article = pipeline
        .generate(
            &request(ArticleType::Timeline, &subs, None),
            &StopHandle::new(),
            &mut |p: ArticleProgress| progress.push(p),
        )
        .await
        .unwrap();

    assert_eq!(article.merged_content, "merged");
    assert_eq!(article.chunks.len(), 3);
    assert_eq!(article.chunks[&0].content, "part A");
    assert_eq!(article.chunks[&0].time_range, "00:00-01:42");
    assert_eq!(article.chunks[&2].time_range, "13:20-13:22");

    let requests = client.requests();
    assert_eq!(requests.len(), 4);
    let prompt = |i: usize| requests[i].last_user_content().unwrap().to_string();
    assert!(prompt(0).contains("line0\nline1"));
    assert!(prompt(0).contains("Target length: 4 words"));
    assert!(prompt(1).contains("line2"));
    assert!(prompt(2).contains("line3"));
    assert!(prompt(3).contains("part A\n\n---\n\npart B\n\n---\n\npart C"));
    assert_eq!(client.max_in_flight.load(Ordering::SeqCst), 1);

    let stages: Vec<ArticleStage> = progress.iter().map(|p| p.stage).collect();
    assert_eq!(
        stages,
        vec![
            ArticleStage::Chunk { index: 0, total: 3 },
            ArticleStage::Chunk { index: 1, total: 3 },
            ArticleStage::Chunk { index: 2, total: 3 },
            ArticleStage::Merging,
            ArticleStage::Done,
        ]
    );
    assert_eq!(progress[3].percent, 92.5);
    assert_eq!(progress[4].percent, 100.0);
}

#[tokio::test]
async fn custom_prompt_drives_the_merge() {
    let subs = subtitles(&[0.0, 10.0]);
    let client = Arc::new(ScriptedClient::replies(&["only part", "custom result"]));
    let pipeline = ArticlePipeline::new(client.clone());

    let article = pipeline
        .generate(
            &request(ArticleType::Custom, &subs, Some("Make a poem of:\n{{chunks}}")),
            &StopHandle::new(),
            &mut |_| {},
        )
        .await
        .unwrap();

    assert_eq!(article.merged_content, "custom result");
    assert_eq!(
        client.requests()[1].last_user_content(),
        Some("Make a poem of:\nonly part")
    );
}

#[tokio::test]
async fn xhs_merge_uses_its_system_prompt() {
    let subs = subtitles(&[0.0]);
    let client = Arc::new(ScriptedClient::replies(&["part", "note #travel"]));
    let pipeline = ArticlePipeline::new(client.clone());

    let article = pipeline
        .generate(
            &request(ArticleType::Xhs, &subs, None),
            &StopHandle::new(),
            &mut |_| {},
        )
        .await
        .unwrap();

    // no gateway configured, so no cover image
    assert_eq!(article.merged_content, "note #travel");
    let requests = client.requests();
    assert!(requests[0].system.is_none());
    assert!(requests[1].system.is_some());
}

#[tokio::test]
async fn stopping_ends_generation_without_a_merge() {
    let subs = subtitles(&[0.0, 400.0, 800.0]);
    let stop = StopHandle::new();
    let trigger = stop.clone();
    let client = Arc::new(ScriptedClient::new(move |_, call| {
        if call == 1 {
            trigger.stop();
        }
        Ok(format!("part {call}"))
    }));
    let pipeline = ArticlePipeline::new(client.clone());

    let result = pipeline
        .generate(&request(ArticleType::List, &subs, None), &stop, &mut |_| {})
        .await;

    assert!(matches!(result, Err(VideosumError::Cancelled)));
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn chunk_failure_stops_the_pipeline() {
    let subs = subtitles(&[0.0, 400.0]);
    let client = Arc::new(ScriptedClient::replies(&["part"]));
    let pipeline = ArticlePipeline::new(client.clone());

    let result = pipeline
        .generate(&request(ArticleType::Regular, &subs, None), &StopHandle::new(), &mut |_| {})
        .await;

    assert!(matches!(result, Err(VideosumError::Completion { .. })));
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn empty_transcripts_are_rejected() {
    let client = Arc::new(ScriptedClient::replies(&[]));
    let pipeline = ArticlePipeline::new(client);
    let result = pipeline
        .generate(&request(ArticleType::Brief, &[], None), &StopHandle::new(), &mut |_| {})
        .await;
    assert!(matches!(result, Err(VideosumError::NoSubtitles)));
}
