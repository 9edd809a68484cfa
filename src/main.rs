use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use ustb_lesson_core::app::{Controller, PollEvent};
use ustb_lesson_core::catalog::CourseCatalog;
use ustb_lesson_core::client::PortalClient;
use ustb_lesson_core::config::{self, PollInterval, TermConfig};
use ustb_lesson_core::error::{ErrorKind, Result};
use ustb_lesson_core::logging;
use ustb_lesson_core::model::CourseCategory;
use ustb_lesson_core::session::{self, CookieEvent, SessionCookies};

#[derive(Parser)]
#[command(name = "ustb-lesson")]
#[command(about = "USTB 抢课: repeat a course registration request until it succeeds", long_about = None)]
#[command(version)]
struct Cli {
    /// Course list file (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add courses from a captured queryKxrw response (reads stdin if FILE is omitted)
    Import {
        file: Option<PathBuf>,
    },

    /// List stored courses
    List,

    /// Remove every stored course
    Clear,

    /// Submit the registration request every interval until it succeeds
    Grab {
        /// pid of the target course (see `list`)
        #[arg(long)]
        course: String,

        #[arg(long, value_enum, default_value = "required")]
        category: CategoryArg,

        /// Milliseconds between attempts (100-10000)
        #[arg(long, default_value_t = PollInterval::DEFAULT_MS)]
        interval: u64,

        /// Session cookie as NAME=VALUE, repeatable
        #[arg(long = "cookie")]
        cookies: Vec<String>,

        /// Whole Cookie header copied from the browser, e.g. "a=1; b=2"
        #[arg(long)]
        cookie_header: Option<String>,

        /// Academic year, e.g. 2025-2026
        #[arg(long)]
        xn: Option<String>,

        /// Term within the year, e.g. 2
        #[arg(long)]
        xq: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    /// 必修课 (bx-b-b)
    Required,
    /// 素质拓展 (sztzk-b-b)
    Quality,
    /// 专业拓展 (zytzk-b-b)
    Major,
}

impl From<CategoryArg> for CourseCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Required => CourseCategory::Required,
            CategoryArg::Quality => CourseCategory::QualityExpansion,
            CategoryArg::Major => CourseCategory::MajorExpansion,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let data_file = config::data_file_path(cli.data_file)?;

    match cli.command {
        Commands::Import { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let mut catalog = load_catalog(data_file);
            let added = catalog.add_from_response(&raw)?;
            println!("新增 {added} 门, 共 {} 门", catalog.len());
        }
        Commands::List => {
            let catalog = load_catalog(data_file);
            if catalog.is_empty() {
                println!("课程池为空");
            }
            for course in catalog.iter() {
                println!("{:<24}{course}", course.pid);
            }
        }
        Commands::Clear => {
            let mut catalog = load_catalog(data_file);
            catalog.clear()?;
            println!("已清空");
        }
        Commands::Grab {
            course,
            category,
            interval,
            cookies,
            cookie_header,
            xn,
            xq,
        } => {
            let mut events = cookies
                .iter()
                .map(|pair| session::parse_cookie_pair(pair))
                .collect::<Result<Vec<_>>>()?;
            if let Some(header) = cookie_header {
                events.extend(session::parse_cookie_header(&header)?);
            }

            let defaults = TermConfig::default();
            let term = TermConfig::new(xn.unwrap_or(defaults.xn), xq.unwrap_or(defaults.xq));

            let session = SessionCookies::new();
            feed_cookies(&session, events).await?;

            let client = Arc::new(PortalClient::new()?);
            let mut controller = Controller::new(client, CourseCatalog::new(data_file), session);
            controller.set_category(category.into());
            controller.set_interval(PollInterval::from_millis(interval)?);
            controller.set_term(term);
            controller.select_course(&course)?;

            grab(&mut controller).await?;
        }
    }

    Ok(())
}

fn load_catalog(path: PathBuf) -> CourseCatalog {
    let mut catalog = CourseCatalog::new(path);
    if let Err(e) = catalog.load_from_disk() {
        tracing::warn!(path = %catalog.path().display(), "读取失败: {e}");
    }
    catalog
}

/// Push the command-line cookies through the same channel a browser
/// integration would use.
async fn feed_cookies(session: &SessionCookies, events: Vec<CookieEvent>) -> Result<()> {
    let (tx, rx) = mpsc::channel(16);
    let feed = session::spawn_cookie_feed(session.clone(), rx);
    for event in events {
        tx.send(event)
            .await
            .map_err(|e| ErrorKind::SessionError(e.to_string()))?;
    }
    drop(tx);
    feed.await
        .map_err(|e| ErrorKind::SessionError(e.to_string()))?;
    Ok(())
}

async fn grab(controller: &mut Controller<PortalClient>) -> Result<()> {
    controller.start()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let next = tokio::select! {
            _ = &mut ctrl_c => None,
            event = controller.next_event() => Some(event),
        };

        match next {
            None => {
                controller.stop();
                break;
            }
            Some(Some(PollEvent::Succeeded { course, attempts })) => {
                println!("恭喜！{} 选课成功！(第 {attempts} 次尝试)", course.name);
                break;
            }
            Some(Some(PollEvent::Stopped)) | Some(None) => break,
            Some(Some(PollEvent::Attempted { .. })) => {}
        }
    }

    Ok(())
}
