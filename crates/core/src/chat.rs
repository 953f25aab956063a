//! Chat about a video, grounded in its detailed summary or an article.

use tracing::{error, info};

use crate::{
    error::Result,
    llm::{CompletionClient, CompletionRequest, DeltaSink, Message},
    session::Session,
    stop::StopHandle,
    types::{Background, ChatMessage, Sender},
};

pub const WELCOME_MESSAGE: &str =
    "Hi! I have read this video. Ask me anything about it.";

const SYSTEM_PROMPT: &str = "You answer questions about a video. Base your answers on the video \
information below. When it does not cover the question, say so before answering from general \
knowledge. Reply in the language the user writes in.";

pub fn welcome() -> ChatMessage {
    ChatMessage::new(Sender::Assistant, WELCOME_MESSAGE)
}

/// The generated text the chat is grounded in, wrapped with the title.
pub fn background_context(session: &Session) -> Option<String> {
    let (tag, body) = match session.background? {
        Background::DetailSummary => ("detailed_summary", session.detail.as_deref()?),
        Background::Article(ty) => ("article", session.articles.get(&ty)?.merged_content.as_str()),
    };
    Some(format!(
        "<video_info>\n<title>{}</title>\n<{tag}>{body}</{tag}>\n</video_info>",
        session.title
    ))
}

pub fn system_prompt(session: &Session) -> String {
    match background_context(session) {
        Some(context) => format!("{SYSTEM_PROMPT}\n\n{context}"),
        None => SYSTEM_PROMPT.to_string(),
    }
}

fn wire_history(messages: &[ChatMessage]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| match m.sender {
            Sender::User => Message::user(&m.content),
            Sender::Assistant => Message::assistant(&m.content),
        })
        .collect()
}

/// Append `content` as a user message and stream the reply into the session.
/// On failure the user message is taken back out. Blank input is ignored.
pub async fn send_message(
    client: &dyn CompletionClient,
    session: &mut Session,
    content: &str,
    stop: &StopHandle,
    on_delta: &mut DeltaSink<'_>,
) -> Result<Option<String>> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    if session.chat_messages.is_empty() {
        session.chat_messages.push(welcome());
    }

    session.chat_messages.push(ChatMessage::new(Sender::User, content));
    let request =
        CompletionRequest::chat(wire_history(&session.chat_messages)).with_system(system_prompt(session));

    match client.stream(&request, on_delta, stop).await {
        Ok(reply) => {
            info!(len = reply.len(), "chat reply received");
            session
                .chat_messages
                .push(ChatMessage::new(Sender::Assistant, reply.clone()));
            session.touch();
            Ok(Some(reply))
        }
        Err(e) => {
            error!(error = %e, "chat reply failed");
            session.chat_messages.pop();
            Err(e)
        }
    }
}

/// Back to just the welcome message.
pub fn clear(session: &mut Session) {
    session.chat_messages = vec![welcome()];
    session.touch();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::transcript::Transcript,
        types::{Article, ArticleType, AudioType, MediaKind, Subtitle},
    };

    fn session() -> Session {
        Session::from_submission(
            "https://host/a.mp3",
            MediaKind::Audio(AudioType::Mpeg),
            None,
            Transcript {
                id: None,
                title: None,
                cover: None,
                subtitles: vec![Subtitle::new(0, 0.0, 1.0, "hi")],
            },
            "en",
        )
    }

    #[test]
    fn background_needs_generated_content() {
        let mut s = session();
        assert_eq!(background_context(&s), None);

        s.background = Some(Background::DetailSummary);
        assert_eq!(background_context(&s), None);

        s.detail = Some("all about cats".into());
        let ctx = background_context(&s).unwrap();
        assert!(ctx.contains("<title>a.mp3</title>"));
        assert!(ctx.contains("<detailed_summary>all about cats</detailed_summary>"));

        s.background = Some(Background::Article(ArticleType::Press));
        s.articles.insert(
            ArticleType::Press,
            Article {
                merged_content: "press release".into(),
                ..Article::default()
            },
        );
        assert!(system_prompt(&s).contains("<article>press release</article>"));
    }

    #[test]
    fn clear_leaves_the_welcome() {
        let mut s = session();
        s.chat_messages.push(ChatMessage::new(Sender::User, "q"));
        clear(&mut s);
        assert_eq!(s.chat_messages.len(), 1);
        assert_eq!(s.chat_messages[0].content, WELCOME_MESSAGE);
    }
}
