use std::{io::Write, path::PathBuf};

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use videosum_core::{
    ArticleType, Background, Sender, Session, SessionStore, StopHandle, SubtitleFormat,
    VideosumError, chat, format_subtitles, types::now_millis,
};

use crate::{context::AppContext, ui, workers::events::Task};

/// Everything generated so far, e.g. `brief, detail, timeline, fr`.
fn artifact_names(session: &Session) -> Vec<String> {
    let mut names = Vec::new();
    if session.brief.is_some() {
        names.push("brief".to_string());
    }
    if session.detail.is_some() {
        names.push("detail".to_string());
    }
    names.extend(session.articles.keys().map(|ty| ty.to_string()));
    names.extend(session.translated_subtitles.keys().cloned());
    names
}

fn age(updated_at: u64) -> String {
    let secs = now_millis().saturating_sub(updated_at) / 1000;
    match secs {
        0..60 => "just now".to_string(),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86400 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}

pub async fn list_sessions(store: &SessionStore) -> Result<()> {
    let sessions = store.list().await?;
    if sessions.is_empty() {
        println!("{}", style("No saved sessions").dim());
        return Ok(());
    }
    for session in sessions {
        let artifacts = artifact_names(&session);
        println!(
            "{}  {}  {} {}",
            style(&session.id).yellow(),
            session.title,
            style(age(session.updated_at)).dim(),
            if artifacts.is_empty() {
                String::new()
            } else {
                style(format!("[{}]", artifacts.join(", "))).cyan().to_string()
            }
        );
    }
    Ok(())
}

#[derive(Default)]
pub struct ShowOnly {
    pub brief: bool,
    pub detail: bool,
    pub article: Option<ArticleType>,
}

impl ShowOnly {
    fn any(&self) -> bool {
        self.brief || self.detail || self.article.is_some()
    }
}

fn print_section(title: &str, body: &str) {
    println!("{}", ui::heading(title));
    println!("{body}");
}

pub async fn show_session(store: &SessionStore, id: &str, only: ShowOnly) -> Result<()> {
    let session = store.get(id).await?;

    if only.any() {
        if only.brief {
            let brief = session.brief.as_deref().unwrap_or_default();
            anyhow::ensure!(!brief.is_empty(), "session {id} has no brief summary");
            println!("{brief}");
        }
        if only.detail {
            let detail = session.detail.as_deref().unwrap_or_default();
            anyhow::ensure!(!detail.is_empty(), "session {id} has no detailed summary");
            println!("{detail}");
        }
        if let Some(ty) = only.article {
            let article = session
                .articles
                .get(&ty)
                .ok_or_else(|| anyhow::anyhow!("session {id} has no {ty} article"))?;
            println!("{}", article.merged_content);
        }
        return Ok(());
    }

    println!("{}", style(&session.title).cyan().bold());
    println!("{} {}", style("Source:").dim(), session.original_video_url);
    if let Some(url) = &session.real_video_url {
        println!("{} {}", style("Media:").dim(), url);
    }
    println!(
        "{} {} · {} · {} subtitles · updated {}",
        style("Kind:").dim(),
        session.media_kind,
        session.language,
        session.original_subtitles.len(),
        age(session.updated_at)
    );
    if let Some(description) = session.description.as_deref().filter(|d| !d.is_empty()) {
        println!("\n{description}");
    }

    if let Some(brief) = &session.brief {
        print_section("Brief summary", brief);
    }
    if let Some(detail) = &session.detail {
        print_section("Detailed summary", detail);
    }
    for (ty, article) in &session.articles {
        print_section(&format!("{ty} article"), &article.merged_content);
    }
    Ok(())
}

/// What the CLI prints after a pipeline run.
pub fn print_task_result(session: &Session, task: Option<Task>) {
    let body = match task {
        Some(Task::Brief) => session.brief.clone(),
        Some(Task::Detail) => session.detail.clone(),
        Some(Task::Article(ty)) => session.articles.get(&ty).map(|a| a.merged_content.clone()),
        Some(Task::Translate) => session.translated_subtitles.get(&session.language).map(|subs| {
            format!(
                "{} translated subtitle lines. Export them with `videosum export {}`.",
                subs.len(),
                session.id
            )
        }),
        None => Some(format!(
            "{} subtitle lines. Generate something with `videosum generate {} --task <TASK>`.",
            session.original_subtitles.len(),
            session.id
        )),
    };
    if let Some(body) = body {
        println!("{}", ui::rule());
        println!("{body}");
    }
}

pub async fn export_subtitles(
    store: &SessionStore,
    id: &str,
    format: SubtitleFormat,
    output: Option<PathBuf>,
    original: bool,
) -> Result<()> {
    let session = store.get(id).await?;
    let subtitles = if original {
        session.original_subtitles.as_slice()
    } else {
        session.current_subtitles()
    };
    let text = format_subtitles(subtitles, format);

    match output {
        Some(path) => {
            tokio::fs::write(&path, text).await?;
            eprintln!(
                "{}",
                ui::done_line(format!("Wrote {} lines to {}", subtitles.len(), path.display()), None)
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Pick what the chat is grounded in: the requested background, or the
/// detailed summary, or the first article.
fn choose_background(session: &Session, requested: Option<Background>) -> Option<Background> {
    requested.or(session.background).or_else(|| {
        if session.detail.is_some() {
            Some(Background::DetailSummary)
        } else {
            session.articles.keys().next().map(|ty| Background::Article(*ty))
        }
    })
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

pub async fn chat(ctx: &AppContext, id: &str, background: Option<Background>) -> Result<()> {
    let client = ctx.completion()?;
    let mut session = ctx.store.get(id).await?;
    session.background = choose_background(&session, background);
    if chat::background_context(&session).is_none() {
        println!(
            "{}",
            style("No summary or article to ground the chat in yet. Answers come from the model alone.")
                .yellow()
        );
    }

    println!("{}", style(&session.title).cyan().bold());
    println!("{}", style("/clear starts over, /exit leaves. Ctrl-C stops a reply.").dim());
    match session.chat_messages.last() {
        Some(last) if last.sender == Sender::Assistant => println!("\n{}", last.content),
        Some(_) => {}
        None => println!("\n{}", chat::WELCOME_MESSAGE),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n{} ", style(">").green().bold());
        flush_stdout();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/exit" | "/quit" => break,
            "/clear" => {
                chat::clear(&mut session);
                ctx.store.save(&session).await?;
                println!("{}", style("History cleared").dim());
                continue;
            }
            _ => {}
        }

        let stop = StopHandle::new();
        let mut print_delta = |delta: &str| {
            print!("{delta}");
            flush_stdout();
        };
        let reply = {
            let send = chat::send_message(
                client.as_ref(),
                &mut session,
                &line,
                &stop,
                &mut print_delta,
            );
            tokio::pin!(send);
            tokio::select! {
                reply = &mut send => reply,
                _ = tokio::signal::ctrl_c() => {
                    stop.stop();
                    send.await
                }
            }
        };
        println!();

        match reply {
            Ok(Some(_)) => {
                ctx.store.save(&session).await?;
            }
            Ok(None) => {}
            Err(VideosumError::Cancelled) => println!("{}", style("Stopped").dim()),
            Err(e) => eprintln!("{}", ui::error_line(e)),
        }
    }
    Ok(())
}

pub async fn refresh(ctx: &AppContext, id: &str) -> Result<()> {
    let mut session = ctx.store.get(id).await?;
    let bar = ui::create_spinner("Checking media URL...");
    let changed = ctx.resolver.refresh_session(&mut session).await;
    bar.finish_and_clear();

    if changed? {
        ctx.store.save(&session).await?;
        println!(
            "{}",
            ui::done_line(
                format!(
                    "New media URL: {}",
                    session.real_video_url.as_deref().unwrap_or_default()
                ),
                None
            )
        );
    } else {
        println!("{}", ui::done_line("Media URL still plays", None));
    }
    Ok(())
}

pub async fn remove_session(store: &SessionStore, id: &str) -> Result<()> {
    store.remove(id).await?;
    println!("{}", ui::done_line(format!("Removed session {id}"), None));
    Ok(())
}

#[cfg(test)]
mod tests {
    use videosum_core::{Article, AudioType, MediaKind, Subtitle, Transcript};

    use super::*;

    fn session() -> Session {
        Session::from_submission(
            "https://host/a.mp3",
            MediaKind::Audio(AudioType::Mpeg),
            None,
            Transcript {
                id: Some("s".into()),
                title: None,
                cover: None,
                subtitles: vec![Subtitle::new(0, 0.0, 1.0, "hi")],
            },
            "en",
        )
    }

    #[test]
    fn artifacts_are_listed_in_a_stable_order() {
        let mut session = session();
        assert!(artifact_names(&session).is_empty());

        session.detail = Some("d".into());
        session.brief = Some("b".into());
        session.set_article(ArticleType::Timeline, Article::default());
        session.set_translation("fr", Vec::new());
        assert_eq!(artifact_names(&session), vec!["brief", "detail", "timeline", "fr"]);
    }

    #[test]
    fn chat_background_falls_back_to_generated_content() {
        let mut session = session();
        assert_eq!(choose_background(&session, None), None);

        session.set_article(ArticleType::Quotes, Article::default());
        assert_eq!(
            choose_background(&session, None),
            Some(Background::Article(ArticleType::Quotes))
        );

        session.detail = Some("d".into());
        assert_eq!(choose_background(&session, None), Some(Background::DetailSummary));
        assert_eq!(
            choose_background(&session, Some(Background::Article(ArticleType::Xhs))),
            Some(Background::Article(ArticleType::Xhs))
        );
    }

    #[test]
    fn ages_round_down() {
        assert_eq!(age(now_millis()), "just now");
        assert_eq!(age(now_millis() - 2 * 3_600_000), "2h ago");
    }
}
