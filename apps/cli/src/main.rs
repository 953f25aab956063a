use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;
use videosum_core::{
    ArticleType, Background, Config, Provider, SessionStore, SubtitleFormat, Translator,
    cache::{get_cache_dir, get_journal_path},
    events::{Event, EventHeader},
};

use crate::{
    context::{AppContext, CliError},
    pipeline::start_pipeline,
    workers::events::{Submission, SubmissionRequested, Task, TranscriptFetched},
};

mod commands;
mod context;
mod pipeline;
mod ui;
mod workers;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliProvider {
    Gateway,
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Gateway => Provider::Gateway,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliTask {
    Brief,
    Detail,
    Article,
    Translate,
}

impl CliTask {
    fn with_article_type(self, article_type: ArticleType) -> Task {
        match self {
            CliTask::Brief => Task::Brief,
            CliTask::Detail => Task::Detail,
            CliTask::Article => Task::Article(article_type),
            CliTask::Translate => Task::Translate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliFormat {
    Vtt,
    Srt,
    Txt,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Vtt => SubtitleFormat::Vtt,
            CliFormat::Srt => SubtitleFormat::Srt,
            CliFormat::Txt => SubtitleFormat::Txt,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliTranslator {
    Llm,
    Deepl,
}

impl From<CliTranslator> for Translator {
    fn from(cli: CliTranslator) -> Self {
        match cli {
            CliTranslator::Llm => Translator::Llm,
            CliTranslator::Deepl => Translator::Deepl,
        }
    }
}

#[derive(Parser)]
#[command(name = "videosum", version)]
#[command(about = "Summarize platform videos and audio files from their subtitles with AI")]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// AI provider for generation
    #[arg(short, long, global = true)]
    provider: Option<CliProvider>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct TaskArgs {
    /// What to generate
    #[arg(short, long)]
    task: Option<CliTask>,

    /// Article style when the task is `article`
    #[arg(short, long, default_value = "regular")]
    article_type: ArticleType,

    /// Output language (e.g. "en", "zh-CN"). Defaults to the configured language.
    #[arg(short, long)]
    lang: Option<String>,

    /// Merge prompt for `custom` articles. `{{chunks}}` marks where the sections go.
    #[arg(long)]
    prompt: Option<String>,

    /// Subtitle translation backend
    #[arg(long)]
    translator: Option<CliTranslator>,

    /// Skip the cover image for xhs articles
    #[arg(long)]
    no_image: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a video or audio URL, fetch its subtitles and save a session
    Summarize {
        /// Video page or audio file URL
        url: String,

        #[command(flatten)]
        args: TaskArgs,

        /// Fetch subtitles again even if they are cached
        #[arg(short, long)]
        force: bool,
    },
    /// Run a generation task on a saved session
    Generate {
        id: String,

        #[command(flatten)]
        args: TaskArgs,
    },
    /// List saved sessions, most recent first
    Sessions,
    /// Print a saved session
    Show {
        id: String,

        /// Only the brief summary
        #[arg(long)]
        brief: bool,

        /// Only the detailed summary
        #[arg(long)]
        detail: bool,

        /// Only the article of this type
        #[arg(long)]
        article: Option<ArticleType>,
    },
    /// Write a session's subtitles as VTT, SRT or plain text
    Export {
        id: String,

        #[arg(short, long, default_value = "srt")]
        format: CliFormat,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export the original subtitles even when a translation exists
        #[arg(long)]
        original: bool,
    },
    /// Chat about a saved session
    Chat {
        id: String,

        /// Ground answers in `detail` or an article type
        #[arg(short, long)]
        background: Option<Background>,
    },
    /// Look up a new playable URL when the saved one has expired
    Refresh { id: String },
    /// Delete a saved session
    Rm { id: String },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply_task_args(config: &mut Config, args: &TaskArgs) -> (Option<Task>, String) {
    if let Some(translator) = args.translator {
        config.translator = translator.into();
    }
    if args.no_image {
        config.generate_xhs_image = false;
    }
    let language = args.lang.clone().unwrap_or_else(|| config.language.clone());
    let task = args.task.map(|t| t.with_article_type(args.article_type));
    (task, language)
}

/// The context for a run, with a completion client when `task` needs one.
fn context_for(config: Config, store: SessionStore, task: Option<Task>) -> Result<AppContext> {
    let deepl = config.translator == Translator::Deepl;
    let ctx = AppContext::new(config, store);
    match task {
        Some(task) if task.needs_llm(deepl) => ctx.with_completion(),
        _ => Ok(ctx),
    }
}

async fn run_pipeline(
    ctx: AppContext,
    first: Arc<dyn Event>,
    first_step: &str,
    journal: Option<PathBuf>,
) -> Result<()> {
    let ctx = Arc::new(ctx);
    println!(
        "\n{}  {}\n",
        style("videosum").cyan().bold(),
        style(format!("Video Summarizer · {}", ctx.provider().name())).dim()
    );

    let bar = ui::create_spinner(first_step);
    let mut handle = start_pipeline(Arc::clone(&ctx), bar.clone(), journal)?;
    let started = Instant::now();
    handle.bus.publish(first);

    let outcome = tokio::select! {
        done = &mut handle.done_rx => done,
        _ = tokio::signal::ctrl_c() => {
            ctx.stop.stop();
            handle.shutdown();
            bar.abandon_with_message("Stopped");
            return Err(CliError::Interrupted.into());
        }
    };
    handle.shutdown();
    bar.finish_and_clear();

    let finished = match outcome {
        Ok(Ok(finished)) => finished,
        Ok(Err(failed)) => anyhow::bail!("{} failed: {}", failed.stage, failed.message),
        Err(_) => anyhow::bail!("pipeline ended without a result"),
    };

    println!(
        "{}",
        ui::done_line(format!("Saved session {}", style(&finished.session.id).yellow()), None)
    );
    println!(
        "\n{} {}",
        style("Total time:").dim(),
        style(ui::format_duration(started.elapsed())).cyan().bold()
    );
    println!(
        "{} {}",
        style("Saved:").dim(),
        style(finished.path.display()).cyan()
    );
    commands::print_task_result(&finished.session, finished.task);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(provider) = cli.provider {
        config.provider = provider.into();
    }
    let store = SessionStore::new(SessionStore::default_dir());

    match cli.command {
        Command::Summarize { url, args, force } => {
            let (task, language) = apply_task_args(&mut config, &args);
            let journal = config
                .journal
                .then(|| get_journal_path(&get_cache_dir(&url)));
            let ctx = context_for(config, store, task)?;
            let submission = Submission {
                url,
                task,
                language,
                custom_prompt: args.prompt,
                force,
            };
            run_pipeline(
                ctx,
                Arc::new(SubmissionRequested::new(submission)),
                "Resolving media...",
                journal,
            )
            .await
        }
        Command::Generate { id, args } => {
            let (task, language) = apply_task_args(&mut config, &args);
            let Some(task) = task else {
                anyhow::bail!("choose what to generate with --task");
            };
            let mut session = store.get(&id).await?;
            session.language = language;
            if args.prompt.is_some() {
                session.custom_article_prompt = args.prompt;
            }
            let journal = config
                .journal
                .then(|| get_journal_path(&get_cache_dir(&session.original_video_url)));
            let ctx = context_for(config, store, Some(task))?;
            let first_step = format!("Generating {task}...");
            run_pipeline(
                ctx,
                Arc::new(TranscriptFetched::new(EventHeader::root(), session, Some(task), true)),
                &first_step,
                journal,
            )
            .await
        }
        Command::Sessions => commands::list_sessions(&store).await,
        Command::Show {
            id,
            brief,
            detail,
            article,
        } => {
            let only = commands::ShowOnly {
                brief,
                detail,
                article,
            };
            commands::show_session(&store, &id, only).await
        }
        Command::Export {
            id,
            format,
            output,
            original,
        } => commands::export_subtitles(&store, &id, format.into(), output, original).await,
        Command::Chat { id, background } => {
            let ctx = AppContext::new(config, store).with_completion()?;
            commands::chat(&ctx, &id, background).await
        }
        Command::Refresh { id } => {
            let ctx = AppContext::new(config, store);
            commands::refresh(&ctx, &id).await
        }
        Command::Rm { id } => commands::remove_session(&store, &id).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}", ui::error_line(format!("{e:#}")));
        std::process::exit(1);
    }
}
