//! 行命令解析与分发
//!
//! 每行输入解析为 [`ShellCommand`]，记录相关命令转换为 `RecordCommand`
//! 交给控制器的 `dispatch`。命令按顺序逐条执行。

use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use dns_panel_client::{
    CertificateSummary, DnsRecordType, DomainSummary, ProviderSummary, RecordApi, ResourceApi,
};
use dns_panel_core::services::{RecordListController, ResourceListController};
use dns_panel_core::types::{
    ActionOutcome, ControllerConfig, PageNav, RecordCommand, RecordDraft, RecordForm,
};
use dns_panel_core::CoreError;

use crate::terminal_view::{next_line, InputLines, TerminalView};

pub const HELP: &str = "\
Records:
  open <domain_id> <domain>        open the record list of a domain
  page <n> | first | prev | next | last
  search <term>                    filter by name or value (search alone clears)
  clear                            clear the search
  refresh
  new                              open the add form
  add <name|@> <type> <value> [ttl=N] [priority=N] [disabled]
  edit <record_id>                 open the edit form
  save field=value ...             submit the edit form (name, type, value, ttl, priority, enabled)
  cancel                           close the open form
  delete <record_id>
  close                            close the record list
Resources:
  providers [page] | domains [provider_id] | certs [page]
  toggle <provider|domain|cert> <id> <on|off>
  remove <provider|domain|cert> <id>
Other:
  status | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Provider,
    Domain,
    Certificate,
}

impl ResourceKind {
    fn parse(word: &str) -> Result<Self> {
        match word.to_ascii_lowercase().as_str() {
            "provider" | "providers" => Ok(Self::Provider),
            "domain" | "domains" => Ok(Self::Domain),
            "cert" | "certs" | "certificate" | "certificates" => Ok(Self::Certificate),
            other => bail!("unknown resource kind: {other}"),
        }
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Record(RecordCommand),
    /// Page of the current search
    Page(u32),
    /// Field assignments applied to the open edit form
    SaveEdit(Vec<(String, String)>),
    List {
        kind: ResourceKind,
        parent: Option<String>,
        page: u32,
    },
    Toggle {
        kind: ResourceKind,
        id: String,
        value: bool,
    },
    Remove {
        kind: ResourceKind,
        id: String,
    },
    Status,
    Help,
    Quit,
    Empty,
}

/// Split a line into words; double quotes group words and are removed.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("{field} must be a number, got \"{raw}\""))
}

fn parse_bool(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("{field} must be on or off, got \"{raw}\""),
    }
}

fn parse_type(raw: &str) -> Result<DnsRecordType> {
    raw.parse::<DnsRecordType>()
        .map_err(|e| anyhow!(e.user_message()))
}

fn split_assignment(word: &str) -> Result<(String, String)> {
    let (key, value) = word
        .split_once('=')
        .ok_or_else(|| anyhow!("expected field=value, got \"{word}\""))?;
    Ok((key.trim().to_ascii_lowercase(), value.to_string()))
}

fn required<'a>(words: &'a [String], index: usize, what: &str) -> Result<&'a str> {
    words
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing {what}"))
}

fn parse_add(words: &[String]) -> Result<RecordDraft> {
    let mut draft = RecordDraft {
        label: required(words, 1, "record name")?.to_string(),
        record_type: parse_type(required(words, 2, "record type")?)?,
        value: required(words, 3, "record value")?.to_string(),
        ..RecordDraft::default()
    };
    for option in &words[4..] {
        if option.eq_ignore_ascii_case("disabled") {
            draft.enabled = false;
            continue;
        }
        match split_assignment(option)? {
            (key, value) if key == "ttl" => draft.ttl = parse_number("ttl", &value)?,
            (key, value) if key == "priority" => {
                draft.priority = Some(parse_number("priority", &value)?);
            }
            (key, _) => bail!("unknown option: {key}"),
        }
    }
    Ok(draft)
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<ShellCommand> {
    let words = tokenize(line)?;
    let Some(head) = words.first() else {
        return Ok(ShellCommand::Empty);
    };
    let rest = || words[1..].join(" ");

    let command = match head.to_ascii_lowercase().as_str() {
        "open" => ShellCommand::Record(RecordCommand::Open {
            domain_id: required(&words, 1, "domain id")?.to_string(),
            domain_name: required(&words, 2, "domain name")?.to_string(),
        }),
        "page" => ShellCommand::Page(parse_number("page", required(&words, 1, "page")?)?),
        "first" => ShellCommand::Record(RecordCommand::Navigate(PageNav::First)),
        "prev" => ShellCommand::Record(RecordCommand::Navigate(PageNav::Prev)),
        "next" => ShellCommand::Record(RecordCommand::Navigate(PageNav::Next)),
        "last" => ShellCommand::Record(RecordCommand::Navigate(PageNav::Last)),
        "search" if words.len() > 1 => ShellCommand::Record(RecordCommand::Search(rest())),
        "search" | "clear" => ShellCommand::Record(RecordCommand::ClearSearch),
        "refresh" => ShellCommand::Record(RecordCommand::Refresh),
        "new" => ShellCommand::Record(RecordCommand::OpenAddForm),
        "add" => ShellCommand::Record(RecordCommand::SubmitAdd(parse_add(&words)?)),
        "edit" => ShellCommand::Record(RecordCommand::Edit(
            required(&words, 1, "record id")?.to_string(),
        )),
        "save" => ShellCommand::SaveEdit(
            words[1..]
                .iter()
                .map(|w| split_assignment(w))
                .collect::<Result<_>>()?,
        ),
        "cancel" => ShellCommand::Record(RecordCommand::CancelForm),
        "delete" => ShellCommand::Record(RecordCommand::Delete(
            required(&words, 1, "record id")?.to_string(),
        )),
        "close" => ShellCommand::Record(RecordCommand::Close),
        "providers" | "certs" | "certificates" => ShellCommand::List {
            kind: ResourceKind::parse(head)?,
            parent: None,
            page: match words.get(1) {
                Some(page) => parse_number("page", page)?,
                None => 1,
            },
        },
        "domains" => ShellCommand::List {
            kind: ResourceKind::Domain,
            parent: words.get(1).cloned(),
            page: 1,
        },
        "toggle" => ShellCommand::Toggle {
            kind: ResourceKind::parse(required(&words, 1, "resource kind")?)?,
            id: required(&words, 2, "id")?.to_string(),
            value: parse_bool("value", required(&words, 3, "on|off")?)?,
        },
        "remove" => ShellCommand::Remove {
            kind: ResourceKind::parse(required(&words, 1, "resource kind")?)?,
            id: required(&words, 2, "id")?.to_string(),
        },
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => bail!("unknown command: {other} (try help)"),
    };
    Ok(command)
}

/// Apply `field=value` pairs to an edit form.
pub fn apply_assignments(form: &mut RecordForm, assignments: &[(String, String)]) -> Result<()> {
    for (key, value) in assignments {
        match key.as_str() {
            "name" => form.name.clone_from(value),
            "type" => form.record_type = parse_type(value)?,
            "value" => form.value.clone_from(value),
            "ttl" => form.ttl = parse_number("ttl", value)?,
            "priority" if value.trim().is_empty() => form.priority = None,
            "priority" => form.priority = Some(parse_number("priority", value)?),
            "enabled" => form.enabled = parse_bool("enabled", value)?,
            other => bail!("unknown field: {other}"),
        }
    }
    Ok(())
}

/// Interactive session over one record list and the resource lists.
pub struct Shell {
    view: Arc<TerminalView>,
    input: InputLines,
    records: RecordListController,
    providers: ResourceListController<ProviderSummary>,
    domains: ResourceListController<DomainSummary>,
    certificates: ResourceListController<CertificateSummary>,
}

impl Shell {
    pub fn new<A>(
        api: &Arc<A>,
        view: &Arc<TerminalView>,
        input: InputLines,
        config: &ControllerConfig,
    ) -> Result<Self>
    where
        A: RecordApi
            + ResourceApi<ProviderSummary>
            + ResourceApi<DomainSummary>
            + ResourceApi<CertificateSummary>
            + 'static,
    {
        Ok(Self {
            view: Arc::clone(view),
            input,
            records: RecordListController::with_config(api.clone(), view.clone(), config.clone())?,
            providers: ResourceListController::with_config(
                api.clone(),
                view.clone(),
                config.clone(),
            )?,
            domains: ResourceListController::with_config(api.clone(), view.clone(), config.clone())?,
            certificates: ResourceListController::with_config(
                api.clone(),
                view.clone(),
                config.clone(),
            )?,
        })
    }

    pub fn records(&self) -> &RecordListController {
        &self.records
    }

    /// Read and execute lines until `quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.view.prompt("dns-panel> ");
            let Some(line) = next_line(&self.input).await else {
                break;
            };
            let flow = match parse_line(&line) {
                Ok(command) => self.execute(command).await,
                Err(e) => {
                    self.view.print(&format!("error: {e}"));
                    ControlFlow::Continue(())
                }
            };
            if flow.is_break() {
                break;
            }
        }
        self.records.close_view();
        Ok(())
    }

    pub async fn execute(&self, command: ShellCommand) -> ControlFlow<()> {
        let outcome = match command {
            ShellCommand::Empty => return ControlFlow::Continue(()),
            ShellCommand::Quit => return ControlFlow::Break(()),
            ShellCommand::Help => {
                self.view.print(HELP);
                return ControlFlow::Continue(());
            }
            ShellCommand::Status => {
                self.print_status();
                return ControlFlow::Continue(());
            }
            ShellCommand::Record(command) => self.records.dispatch(command).await,
            ShellCommand::Page(page) => {
                let search = self.records.search_term().unwrap_or_default();
                self.records
                    .dispatch(RecordCommand::LoadPage { page, search })
                    .await
            }
            ShellCommand::SaveEdit(assignments) => match self.edited_form(&assignments) {
                Ok(form) => self.records.dispatch(RecordCommand::SubmitEdit(form)).await,
                Err(e) => {
                    self.view.print(&format!("error: {e:#}"));
                    return ControlFlow::Continue(());
                }
            },
            ShellCommand::List { kind, parent, page } => {
                self.list_resources(kind, parent.as_deref(), page).await
            }
            ShellCommand::Toggle { kind, id, value } => match kind {
                ResourceKind::Provider => self.providers.toggle(&id, value).await,
                ResourceKind::Domain => self.domains.toggle(&id, value).await,
                ResourceKind::Certificate => self.certificates.toggle(&id, value).await,
            },
            ShellCommand::Remove { kind, id } => match kind {
                ResourceKind::Provider => self.providers.delete(&id).await,
                ResourceKind::Domain => self.domains.delete(&id).await,
                ResourceKind::Certificate => self.certificates.delete(&id).await,
            },
        };
        self.report(&outcome);
        ControlFlow::Continue(())
    }

    fn edited_form(&self, assignments: &[(String, String)]) -> Result<RecordForm> {
        let mut form = self
            .records
            .edit_form()
            .context("no edit form is open (use: edit <record_id>)")?;
        apply_assignments(&mut form, assignments)?;
        Ok(form)
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        parent: Option<&str>,
        page: u32,
    ) -> ActionOutcome {
        let outcome = match kind {
            ResourceKind::Provider => self.providers.open(None).await,
            ResourceKind::Domain => self.domains.open(parent).await,
            ResourceKind::Certificate => self.certificates.open(None).await,
        };
        if page <= 1 || !outcome.is_applied() {
            return outcome;
        }
        match kind {
            ResourceKind::Provider => self.providers.load_page(page, "").await,
            ResourceKind::Domain => self.domains.load_page(page, "").await,
            ResourceKind::Certificate => self.certificates.load_page(page, "").await,
        }
    }

    /// Failures already produced a notice; only the ones without one are
    /// reported here.
    fn report(&self, outcome: &ActionOutcome) {
        match outcome.error() {
            Some(CoreError::NoActiveView) => self
                .view
                .print("nothing open (use: open <domain_id> <domain> or providers)"),
            Some(CoreError::ControlBusy(control)) => {
                self.view.print(&format!("{control} is still in progress"));
            }
            _ if matches!(outcome, ActionOutcome::Cancelled) => self.view.print("cancelled"),
            _ => {}
        }
    }

    fn print_status(&self) {
        let state = self.records.view_state();
        let domain = self
            .records
            .domain()
            .map_or_else(|| "-".to_string(), |d| d.name);
        self.view.print(&format!("view: {state:?}  domain: {domain}"));
        if let Some(snapshot) = self.records.snapshot() {
            self.view.print(&snapshot.pagination.label());
        }
        let busy = self.view.busy_controls();
        if !busy.is_empty() {
            self.view.print(&format!("busy: {}", busy.join(", ")));
        }
        for notice in self.view.active_notices() {
            self.view.print(&format!("notice: {}", notice.message));
        }
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;
