use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use issue_query::results::ResultRow;
use issue_query::{
    append_key_value, CorpusSnapshot, CrawledIssueResults, IssueSearch, SearchConfig, SharedCorpus,
};

/// 在爬取的 issue 语料上交互式执行查询
#[derive(Debug, Parser)]
#[command(name = "issue_query", version)]
struct Args {
    /// issue 语料 JSON 文件
    corpus: PathBuf,
    /// 搜索配置 JSON 文件
    #[arg(long, default_value = "search_config.json")]
    config: PathBuf,
    /// 执行一次查询后退出
    #[arg(short, long)]
    query: Option<String>,
}

/// 加载配置，失败时使用默认配置
fn load_config(path: &Path) -> SearchConfig {
    match SearchConfig::from_json_file(path) {
        Ok(config) => {
            info!(path = %path.display(), "已加载搜索配置");
            config
        }
        Err(e) => {
            warn!(error = %e, "使用默认搜索配置");
            SearchConfig::default()
        }
    }
}

/// REPL 的当前状态：查询文本、结果和页码
struct Session {
    search: IssueSearch<SharedCorpus>,
    corpus_path: PathBuf,
    page_size: usize,
    text: String,
    results: CrawledIssueResults,
    page: usize,
}

impl Session {
    fn run(&mut self, text: String) {
        self.results = self.search.search(&text);
        self.text = text;
        self.page = 1;
    }

    fn print(&self) {
        let page = self.results.page(self.page, self.page_size);
        println!(
            "\n[{}] {} 个 issue，{} 个仓库（第 {}/{} 页）",
            self.text,
            self.results.issue_count(),
            self.results.group_count(),
            page.page_number,
            page.page_count
        );
        for row in page.rows {
            match row {
                ResultRow::Group(group) => {
                    let marker = if group.is_expanded { "▾" } else { "▸" };
                    println!("{} {} ({})", marker, group.repository_name, group.issues.len());
                }
                ResultRow::Issue(issue) => {
                    let kind = if issue.is_pull_request { "PR" } else { "issue" };
                    print!("    #{} [{} {}] {}", issue.number, kind, issue.state.as_str(), issue.title);
                    if !issue.labels.is_empty() {
                        print!("  {{{}}}", issue.labels.join(", "));
                    }
                    println!();
                }
            }
        }
    }

    /// 处理 `:` 开头的命令，返回 false 表示退出
    fn command(&mut self, line: &str) -> anyhow::Result<bool> {
        let (name, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match name {
            ":quit" | ":q" => return Ok(false),
            ":collapse" => {
                self.results.collapse_all();
                self.page = 1;
            }
            ":expand" => {
                self.results.expand_all();
                self.page = 1;
            }
            ":page" => match arg.parse::<usize>() {
                Ok(page) => self.page = page,
                Err(_) => println!("用法: :page <页码>"),
            },
            ":label" if !arg.is_empty() => {
                let text = append_key_value(&self.text, "label", arg);
                if text != self.text {
                    self.run(text);
                }
            }
            ":reload" => {
                let snapshot = CorpusSnapshot::from_json_file(&self.corpus_path)?;
                self.search.source().replace(snapshot);
                let text = std::mem::take(&mut self.text);
                self.run(text);
            }
            _ => {
                println!("命令: :collapse :expand :page <N> :label <名称> :reload :quit");
                return Ok(true);
            }
        }

        self.print();
        Ok(true)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = load_config(&args.config);

    let snapshot = CorpusSnapshot::from_json_file(&args.corpus)
        .with_context(|| format!("无法加载语料 {}", args.corpus.display()))?;
    let search = IssueSearch::from_config(&config, SharedCorpus::new(snapshot));

    let mut session = Session {
        search,
        corpus_path: args.corpus,
        page_size: config.page_size,
        text: String::new(),
        results: CrawledIssueResults::empty(),
        page: 1,
    };

    if let Some(query) = args.query {
        session.run(query);
        session.print();
        return Ok(());
    }

    session.run(config.default_query.clone());
    session.print();

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("query> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                if line.starts_with(':') {
                    match session.command(line) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => println!("✗ {:#}", e),
                    }
                } else {
                    session.run(line.to_string());
                    session.print();
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
