//! 交互式命令行
//!
//! 逐行读取命令并调用会话命令。图片可以用 id 或 `#序号`（从 1 开始）引用。

use std::io::{BufRead, Write};

use img2pdf_core::ImageId;

use crate::commands;
use crate::session::Session;

const HELP: &str = "\
commands:
  add <path>...            select images (appended in the given order)
  ls                       list images in page order
  rm <ref>                 remove an image
  mv <ref> <ref|->         move an image onto another one's position (- = dropped outside)
  export                   generate the PDF
  clear                    remove every image
  config [save|reload]     show, save or reload the configuration
  help                     show this help
  quit                     leave (images are not kept)
<ref> is an image id or its position, e.g. #2";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Add(Vec<String>),
    List,
    Remove(String),
    Move(String, Option<String>),
    Export,
    Clear,
    Config(Option<String>),
    Help,
    Quit,
}

/// 按空白拆分，支持双引号包裹含空格的路径
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match (head.as_str(), args) {
        ("add", []) => return Err("usage: add <path>...".to_string()),
        ("add", paths) => ShellCommand::Add(paths.to_vec()),
        ("ls" | "list", []) => ShellCommand::List,
        ("rm" | "remove", [target]) => ShellCommand::Remove(target.clone()),
        ("mv" | "move", [moved, target]) => {
            let target = (target != "-").then(|| target.clone());
            ShellCommand::Move(moved.clone(), target)
        }
        ("export" | "generate", []) => ShellCommand::Export,
        ("clear", []) => ShellCommand::Clear,
        ("config", []) => ShellCommand::Config(None),
        ("config", [action]) if action == "save" || action == "reload" => {
            ShellCommand::Config(Some(action.clone()))
        }
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        (other, _) => return Err(format!("unknown command or arguments: {} (try `help`)", other)),
    };
    Ok(Some(command))
}

pub struct Shell<R, W> {
    session: Session,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(session: Session, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// 把 `#n` / `n` 转换为对应位置的 id，其余按 id 解析
    fn resolve(&self, reference: &str) -> Result<String, String> {
        let position = reference.strip_prefix('#').unwrap_or(reference);
        if let Ok(n) = position.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|index| self.session.collection().id_at(index))
                .map(|id| id.to_string())
                .ok_or_else(|| format!("no image at position {}", n));
        }
        reference
            .parse::<ImageId>()
            .map(|id| id.to_string())
            .map_err(|_| format!("not an image id or position: {}", reference))
    }

    fn prompt(&mut self) -> std::io::Result<()> {
        let label = if self.session.collection().is_empty() {
            "Select Images"
        } else {
            "Add More"
        };
        write!(self.output, "[{} | {} image(s)] > ", label, self.session.collection().len())?;
        self.output.flush()
    }

    fn print_list(&mut self) -> std::io::Result<()> {
        let images = commands::list_images(&self.session);
        if images.is_empty() {
            return writeln!(self.output, "no images selected; use `add <path>...`");
        }
        for image in images {
            let preview = match image.preview {
                Some((w, h)) => format!("{}x{}", w, h),
                None => "no preview".to_string(),
            };
            writeln!(
                self.output,
                "#{:<3} {}  {}  [{}]",
                image.position, image.id, image.name, preview
            )?;
        }
        Ok(())
    }

    /// 执行一条命令，返回 `false` 表示退出
    pub async fn execute(&mut self, command: ShellCommand) -> std::io::Result<bool> {
        match command {
            ShellCommand::Add(paths) => match commands::add_images(&mut self.session, paths) {
                Ok(added) => {
                    for image in added {
                        writeln!(self.output, "added #{} {} ({})", image.position, image.name, image.id)?;
                    }
                }
                Err(e) => writeln!(self.output, "error: {}", e)?,
            },
            ShellCommand::List => self.print_list()?,
            ShellCommand::Remove(reference) => {
                let result = self
                    .resolve(&reference)
                    .and_then(|id| commands::remove_image(&mut self.session, id));
                match result {
                    Ok(true) => writeln!(self.output, "removed {}", reference)?,
                    Ok(false) => writeln!(self.output, "nothing to remove for {}", reference)?,
                    Err(e) => writeln!(self.output, "error: {}", e)?,
                }
            }
            ShellCommand::Move(moved, target) => {
                let result = self.resolve(&moved).and_then(|moved| {
                    let target = target.as_deref().map(|t| self.resolve(t)).transpose()?;
                    Ok((moved, target))
                });
                match result.and_then(|(moved, target)| commands::reorder_images(&mut self.session, moved, target)) {
                    Ok(true) => self.print_list()?,
                    Ok(false) => writeln!(self.output, "order unchanged")?,
                    Err(e) => writeln!(self.output, "error: {}", e)?,
                }
            }
            ShellCommand::Export => match commands::generate_pdf(&self.session).await {
                Ok(report) => writeln!(
                    self.output,
                    "saved {} ({} page(s), {} bytes)",
                    report.location.display(),
                    report.page_count,
                    report.bytes
                )?,
                Err(e) => writeln!(self.output, "{}", e)?,
            },
            ShellCommand::Clear => {
                self.session.collection_mut().clear();
                writeln!(self.output, "cleared")?;
            }
            ShellCommand::Config(action) => {
                let message = match action.as_deref() {
                    Some("save") => commands::save_config(&self.session).map(|path| format!("saved {}", path.display())),
                    Some("reload") => commands::reload_config(&mut self.session).map(|_| "reloaded".to_string()),
                    _ => commands::show_config(&self.session),
                };
                match message {
                    Ok(text) => writeln!(self.output, "{}", text)?,
                    Err(e) => writeln!(self.output, "error: {}", e)?,
                }
            }
            ShellCommand::Help => writeln!(self.output, "{}", HELP)?,
            ShellCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// 读取输入直到 `quit` 或输入结束
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut line = String::new();
        loop {
            self.prompt()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command).await? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(self.output, "error: {}", e)?,
            }
        }
        log::info!("[Shell] 会话结束，丢弃 {} 张图片", self.session.collection().len());
        Ok(())
    }
}
