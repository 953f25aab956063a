mod common;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use common::{ScriptedClient, subtitles};
use videosum_core::{
    AudioType, MediaKind, Session, StopHandle, Transcript, TranslationBackend,
    TranslationProgress, VideosumError, chat, summary, translate_subtitles,
};

#[tokio::test]
async fn detail_stages_feed_each_other() {
    let subs = subtitles(&[0.0, 5.0]);
    let client = ScriptedClient::replies(&["the narrative", "the outline", "```markdown\n# Final\n```"]);

    let mut seen = Vec::new();
    let detail = summary::generate_detail(&client, &subs, "en", &mut |p: u8| seen.push(p))
        .await
        .unwrap();

    assert_eq!(detail, "# Final");
    assert_eq!(seen, vec![0, 33, 66, 100]);

    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].last_user_content(), Some("line0\nline1"));
    assert_eq!(requests[1].last_user_content(), Some("the narrative"));
    assert!(requests[1].system.as_deref().unwrap().contains("the narrative"));
    let last_system = requests[2].system.as_deref().unwrap();
    assert!(last_system.contains("the outline"));
    assert!(last_system.contains("line0\nline1"));
}

#[tokio::test]
async fn empty_detail_is_an_error() {
    let subs = subtitles(&[0.0]);
    let client = ScriptedClient::replies(&["n", "o", "```\n```"]);
    let result = summary::generate_detail(&client, &subs, "en", &mut |_: u8| {}).await;
    assert!(matches!(result, Err(VideosumError::EmptyCompletion { stage: "detail" })));
}

#[tokio::test]
async fn brief_prompt_carries_title_and_lines() {
    let subs = subtitles(&[0.0, 1.0]);
    let client = ScriptedClient::replies(&["# Mind map"]);
    let brief = summary::generate_brief(&client, "Cats", &subs, "zh-CN").await.unwrap();
    assert_eq!(brief, "# Mind map");
    assert_eq!(
        client.requests()[0].last_user_content(),
        Some("Video Title: Cats\nVideo Subtitles:\nline0\nline1")
    );
}

/// Echo back every numbered line of the batch, reversed and prefixed.
fn translate_batch(prompt: &str) -> String {
    let mut lines: Vec<String> = prompt
        .lines()
        .filter_map(|line| {
            let (index, text) = line.split_once(' ')?;
            index.parse::<usize>().ok()?;
            text.starts_with("line").then(|| format!("{index} fr-{text}"))
        })
        .collect();
    lines.reverse();
    format!("Here you go\n<output_text>\n{}\n</output_text>", lines.join("\n"))
}

#[tokio::test]
async fn llm_translation_retries_and_restores_order() {
    let starts: Vec<f64> = (0..120).map(|i| i as f64).collect();
    let subs = subtitles(&starts);
    let failed_once = AtomicBool::new(false);
    let client = Arc::new(ScriptedClient::new(move |request, _| {
        let prompt = request.last_user_content().unwrap_or_default();
        if prompt.contains("\n0 line0\n") && !failed_once.swap(true, Ordering::SeqCst) {
            return Ok("0 only one line".to_string());
        }
        Ok(translate_batch(prompt))
    }));
    let backend = TranslationBackend::Llm(client.clone());

    let mut progress: Vec<TranslationProgress> = Vec::new();
    let translated = translate_subtitles(&backend, &subs, "fr", &mut |p: TranslationProgress| {
        progress.push(p)
    })
    .await
    .unwrap();

    assert_eq!(translated.len(), 120);
    assert!(translated.windows(2).all(|w| w[0].index < w[1].index));
    assert_eq!(translated[7].text, "fr-line7");
    assert_eq!(translated[7].start, 7.0);
    assert_eq!(translated[7].end, 9.0);

    // three batches plus one retry, with the batches running concurrently
    assert_eq!(client.requests().len(), 4);
    assert!(client.max_in_flight.load(Ordering::SeqCst) > 1);
    assert!(client.requests().iter().all(|r| r.temperature == Some(0.0)));
    assert_eq!(progress.last(), Some(&TranslationProgress { done: 3, total: 3 }));
}

#[tokio::test]
async fn no_need_keeps_the_source_text() {
    let subs = subtitles(&[0.0, 1.0]);
    let client = Arc::new(ScriptedClient::replies(&["<NO_NEED>"]));
    let translated = translate_subtitles(
        &TranslationBackend::Llm(client),
        &subs,
        "en",
        &mut |_: TranslationProgress| {},
    )
    .await
    .unwrap();
    assert_eq!(translated, subs);
}

#[tokio::test]
async fn translation_gives_up_after_three_attempts() {
    let subs = subtitles(&[0.0, 1.0]);
    let client = Arc::new(ScriptedClient::new(|_, _| Ok("nothing useful".to_string())));
    let result = translate_subtitles(
        &TranslationBackend::Llm(client.clone()),
        &subs,
        "de",
        &mut |_: TranslationProgress| {},
    )
    .await;
    assert!(matches!(result, Err(VideosumError::Translation { .. })));
    assert_eq!(client.requests().len(), 3);
}

#[tokio::test]
async fn translation_runs_on_a_spawned_task() {
    let subs = subtitles(&(0..60).map(|i| i as f64).collect::<Vec<_>>());
    let client = Arc::new(ScriptedClient::new(|request, _| {
        Ok(translate_batch(request.last_user_content().unwrap_or_default()))
    }));
    let backend = TranslationBackend::Llm(client);

    let task = tokio::spawn(async move {
        let mut done = 0;
        let translated =
            translate_subtitles(&backend, &subs, "fr", &mut |p: TranslationProgress| done = p.done)
                .await;
        (translated, done)
    });

    let (translated, done) = task.await.unwrap();
    let translated = translated.unwrap();
    assert_eq!(translated.len(), 60);
    assert_eq!(translated[59].text, "fr-line59");
    assert_eq!(done, 2);
}

fn session() -> Session {
    Session::from_submission(
        "https://host/talk.mp3",
        MediaKind::Audio(AudioType::Mpeg),
        None,
        Transcript {
            id: Some("s1".into()),
            title: None,
            cover: None,
            subtitles: subtitles(&[0.0]),
        },
        "en",
    )
}

#[tokio::test]
async fn chat_sends_history_and_keeps_the_reply() {
    let client = ScriptedClient::replies(&["It is about cats."]);
    let mut session = session();
    session.background = Some(videosum_core::Background::DetailSummary);
    session.detail = Some("cats everywhere".into());

    let mut streamed = String::new();
    let reply = chat::send_message(
        &client,
        &mut session,
        "What is it about?",
        &StopHandle::new(),
        &mut |d: &str| streamed.push_str(d),
    )
    .await
    .unwrap();

    assert_eq!(reply.as_deref(), Some("It is about cats."));
    assert_eq!(streamed, "It is about cats.");
    assert_eq!(session.chat_messages.len(), 3);
    assert_eq!(session.chat_messages[0].content, chat::WELCOME_MESSAGE);

    let request = &client.requests()[0];
    assert_eq!(request.messages.len(), 2);
    assert!(request.system.as_deref().unwrap().contains("cats everywhere"));
}

#[tokio::test]
async fn failed_chat_rolls_back_the_question() {
    let client = ScriptedClient::replies(&[]);
    let mut session = session();

    let result = chat::send_message(
        &client,
        &mut session,
        "hello?",
        &StopHandle::new(),
        &mut |_: &str| {},
    )
    .await;

    assert!(result.is_err());
    assert_eq!(session.chat_messages.len(), 1);

    let blank = chat::send_message(&client, &mut session, "   ", &StopHandle::new(), &mut |_: &str| {})
        .await
        .unwrap();
    assert_eq!(blank, None);
}
