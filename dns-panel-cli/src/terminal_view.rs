//! 终端视图：把控制器的渲染回调输出为纯文本表格

use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use dns_panel_client::{CertificateSummary, DomainSummary, ProviderSummary, Resource};
use dns_panel_core::traits::{BusyIndicator, NoticeSink, RecordView, ResourceView};
use dns_panel_core::types::{
    ActionControl, DomainRef, FormKind, Notice, NoticeLevel, NoticeScope, PaginationControls,
    RecordForm, RecordSnapshot, ResourceSnapshot,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use unicode_width::UnicodeWidthStr;

/// 列之间的间距
const COLUMN_GAP: usize = 2;
/// 单元格最大显示宽度，超出截断
const MAX_CELL_WIDTH: usize = 48;

/// Line source shared by the shell and confirmation prompts.
pub type InputLines = Arc<tokio::sync::Mutex<Lines<Box<dyn AsyncBufRead + Unpin + Send>>>>;

pub fn input_lines(reader: Box<dyn AsyncBufRead + Unpin + Send>) -> InputLines {
    Arc::new(tokio::sync::Mutex::new(reader.lines()))
}

/// Read the next line; `None` at end of input or on a read error.
pub async fn next_line(input: &InputLines) -> Option<String> {
    match input.lock().await.next_line().await {
        Ok(line) => line,
        Err(e) => {
            log::error!("Failed to read input: {e}");
            None
        }
    }
}

/// Columns of a resource table.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for ProviderSummary {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "TYPE", "ENABLED", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.provider_type.to_string(),
            yes_no(self.enabled).to_string(),
            self.status.clone(),
        ]
    }
}

impl TableRow for DomainSummary {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "PROVIDER", "ENABLED", "AUTO UPDATE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.provider_id.clone(),
            yes_no(self.enabled).to_string(),
            yes_no(self.auto_update).to_string(),
        ]
    }
}

impl TableRow for CertificateSummary {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "DOMAIN", "STATUS", "AUTO RENEW", "EXPIRES"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.domain_id.clone(),
            self.status.to_string(),
            yes_no(self.auto_renew).to_string(),
            self.not_after
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string()),
        ]
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Plain-text implementation of the view traits.
pub struct TerminalView {
    out: Mutex<Box<dyn Write + Send>>,
    input: InputLines,
    notices: Mutex<Vec<Notice>>,
    busy: Mutex<HashSet<ActionControl>>,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>, input: InputLines) -> Self {
        Self {
            out: Mutex::new(out),
            input,
            notices: Mutex::new(Vec::new()),
            busy: Mutex::new(HashSet::new()),
        }
    }

    /// Notices not yet dismissed.
    pub fn active_notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn busy_controls(&self) -> Vec<String> {
        let mut controls: Vec<String> = lock(&self.busy).iter().map(ToString::to_string).collect();
        controls.sort();
        controls
    }

    /// Write `text` followed by a newline.
    pub fn print(&self, text: &str) {
        let mut out = lock(&self.out);
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            log::error!("Failed to write to terminal: {e}");
        }
    }

    /// Write `text` without a newline.
    pub fn prompt(&self, text: &str) {
        let mut out = lock(&self.out);
        if let Err(e) = write!(out, "{text}").and_then(|()| out.flush()) {
            log::error!("Failed to write to terminal: {e}");
        }
    }

    async fn ask(&self, prompt: &str) -> bool {
        self.prompt(&format!("{prompt} [y/N] "));
        let answer = next_line(&self.input).await.unwrap_or_default();
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Left-aligned table sized by display width.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| truncate_cell(cell)).collect())
        .collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let header_cells: Vec<String> = headers.iter().map(ToString::to_string).collect();
    std::iter::once(&header_cells)
        .chain(cells.iter())
        .map(|row| format_row(row, &widths))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, cell) in row.iter().enumerate() {
        line.push_str(cell);
        if i + 1 < row.len() {
            let width = widths.get(i).copied().unwrap_or(0);
            let pad = width.saturating_sub(cell.width()) + COLUMN_GAP;
            line.push_str(&" ".repeat(pad));
        }
    }
    line
}

fn truncate_cell(cell: &str) -> String {
    if cell.width() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in cell.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > MAX_CELL_WIDTH - 1 {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}

fn pagination_line(controls: &PaginationControls) -> Option<String> {
    if !controls.visible {
        return None;
    }
    let button = |enabled: bool, label: &str| {
        if enabled {
            label.to_string()
        } else {
            format!("({label})")
        }
    };
    Some(format!(
        "{}  [{} {} {} {}]",
        controls.label(),
        button(controls.first_enabled, "first"),
        button(controls.prev_enabled, "prev"),
        button(controls.next_enabled, "next"),
        button(controls.last_enabled, "last"),
    ))
}

/// Text of a rendered record snapshot.
pub fn format_records(snapshot: &RecordSnapshot) -> String {
    let mut text = format!("Records of {}", snapshot.domain.name);
    if !snapshot.search.is_empty() {
        text.push_str(&format!(" matching \"{}\"", snapshot.search));
    }
    text.push('\n');
    if let Some(message) = snapshot.empty_message() {
        text.push_str(&message);
    } else {
        let rows: Vec<Vec<String>> = snapshot
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.name.clone(),
                    row.record_type.to_string(),
                    row.value.clone(),
                    row.ttl.to_string(),
                    row.priority_label(),
                    row.status_label().to_string(),
                ]
            })
            .collect();
        text.push_str(&format_table(
            &["ID", "NAME", "TYPE", "VALUE", "TTL", "PRIORITY", "STATUS"],
            &rows,
        ));
    }
    if let Some(line) = pagination_line(&snapshot.pagination) {
        text.push('\n');
        text.push_str(&line);
    }
    text
}

pub fn format_resources<R: Resource + TableRow>(snapshot: &ResourceSnapshot<R>) -> String {
    let mut text = format!("{}s", capitalize(R::KIND));
    if !snapshot.search.is_empty() {
        text.push_str(&format!(" matching \"{}\"", snapshot.search));
    }
    text.push('\n');
    if snapshot.items.is_empty() {
        text.push_str(&format!("no {}s", R::KIND));
    } else {
        let rows: Vec<Vec<String>> = snapshot.items.iter().map(TableRow::cells).collect();
        text.push_str(&format_table(R::HEADERS, &rows));
    }
    if let Some(line) = pagination_line(&snapshot.pagination) {
        text.push('\n');
        text.push_str(&line);
    }
    text
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn notice_prefix(notice: &Notice) -> String {
    let level = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    match notice.scope {
        NoticeScope::List => format!("[{level}]"),
        NoticeScope::AddForm => format!("[{level}] add form:"),
        NoticeScope::EditForm => format!("[{level}] edit form:"),
    }
}

impl BusyIndicator for TerminalView {
    fn set_busy(&self, control: &ActionControl, busy: bool) {
        let mut active = lock(&self.busy);
        if busy {
            active.insert(control.clone());
        } else {
            active.remove(control);
        }
    }
}

impl NoticeSink for TerminalView {
    fn show_notice(&self, notice: &Notice) {
        lock(&self.notices).push(notice.clone());
        self.print(&format!("{} {}", notice_prefix(notice), notice.message));
    }

    fn dismiss_notice(&self, _scope: NoticeScope, id: u64) {
        lock(&self.notices).retain(|n| n.id != id);
    }
}

#[async_trait]
impl RecordView for TerminalView {
    fn attach(&self, domain: &DomainRef) {
        self.print(&format!("== {} ({}) ==", domain.name, domain.id));
    }

    fn render(&self, snapshot: &RecordSnapshot) {
        self.print(&format_records(snapshot));
    }

    fn open_add_form(&self) {
        self.print(
            "New record: add <name|@> <type> <value> [ttl=600] [priority=N] [disabled], or cancel",
        );
    }

    fn open_edit_form(&self, form: &RecordForm) {
        let priority = form
            .priority
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        self.print(&format!(
            "Editing record {}: name={} type={} value={} ttl={} priority={} enabled={}\n\
             Change fields with: save field=value ..., or cancel",
            form.record_id, form.name, form.record_type, form.value, form.ttl, priority, form.enabled,
        ));
    }

    fn close_form(&self, kind: FormKind) {
        log::debug!("Closed {kind:?} form");
    }

    fn detach(&self) {
        self.print("Record view closed");
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.ask(prompt).await
    }
}

#[async_trait]
impl<R: Resource + TableRow> ResourceView<R> for TerminalView {
    fn render(&self, snapshot: &ResourceSnapshot<R>) {
        self.print(&format_resources(snapshot));
    }

    fn show_flag(&self, id: &str, value: bool) {
        self.print(&format!(
            "{} {id}: {} {}",
            R::KIND,
            R::FLAG_FIELD,
            if value { "on" } else { "off" }
        ));
    }

    fn detach(&self) {
        log::debug!("Closed {} list", R::KIND);
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.ask(prompt).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dns_panel_client::{DnsRecord, DnsRecordType, Page, RecordQuery};
    use std::time::Duration;

    /// 可共享读取的输出缓冲
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn view_with_input(input: &'static [u8]) -> (TerminalView, SharedBuf) {
        let buf = SharedBuf::default();
        let view = TerminalView::new(Box::new(buf.clone()), input_lines(Box::new(input)));
        (view, buf)
    }

    fn records(count: u32) -> Vec<DnsRecord> {
        (1..=count)
            .map(|i| DnsRecord {
                id: i.to_string(),
                domain_id: "1".into(),
                name: format!("host{i}.example.com"),
                record_type: DnsRecordType::A,
                value: format!("10.0.0.{i}"),
                ttl: 600,
                enabled: i % 2 == 1,
                priority: None,
                created_at: None,
                updated_at: None,
            })
            .collect()
    }

    fn domain() -> DomainRef {
        DomainRef {
            id: "1".into(),
            name: "example.com".into(),
        }
    }

    #[test]
    fn test_table_aligns_wide_characters() {
        let table = format_table(
            &["ID", "NAME"],
            &[
                vec!["1".into(), "解析".into()],
                vec!["22".into(), "ab".into()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "1   解析");
        assert_eq!(lines[2], "22  ab");
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "x".repeat(100);
        let cell = truncate_cell(&long);
        assert_eq!(cell.width(), MAX_CELL_WIDTH);
        assert!(cell.ends_with('…'));
    }

    #[test]
    fn test_record_page_text() {
        let all = records(7);
        let page = Page::from_full_list(&all, &RecordQuery::new(1, 5, ""));
        let text = format_records(&RecordSnapshot::from_page(&domain(), &page, ""));

        assert!(text.starts_with("Records of example.com\nID"));
        assert!(text.contains("host5.example.com"));
        assert!(!text.contains("host6.example.com"));
        assert!(text.ends_with("page 1 of 2 (7 records)  [(first) (prev) next last]"));
    }

    #[test]
    fn test_empty_search_result_text() {
        let page = Page::<DnsRecord>::from_full_list(&[], &RecordQuery::new(1, 5, "zzz"));
        let text = format_records(&RecordSnapshot::from_page(&domain(), &page, "zzz"));
        assert_eq!(
            text,
            "Records of example.com matching \"zzz\"\nno records match \"zzz\""
        );
    }

    #[test]
    fn test_notices_are_printed_and_dismissed() {
        let (view, buf) = view_with_input(b"");
        let notice = Notice {
            id: 4,
            scope: NoticeScope::AddForm,
            level: NoticeLevel::Error,
            message: "ttl must be positive".into(),
            ttl: Duration::from_secs(5),
        };
        view.show_notice(&notice);
        assert_eq!(buf.text(), "[error] add form: ttl must be positive\n");
        assert_eq!(view.active_notices().len(), 1);

        view.dismiss_notice(NoticeScope::AddForm, 4);
        assert!(view.active_notices().is_empty());
    }

    #[test]
    fn test_busy_controls_tracked() {
        let (view, _) = view_with_input(b"");
        view.set_busy(&ActionControl::Delete("7".into()), true);
        view.set_busy(&ActionControl::Refresh, true);
        view.set_busy(&ActionControl::Refresh, false);
        assert_eq!(view.busy_controls(), vec!["delete:7".to_string()]);
    }

    #[tokio::test]
    async fn test_confirm_reads_answer() {
        let (view, buf) = view_with_input(b"y\nno\n");
        assert!(RecordView::confirm(&view, "Delete record 1?").await);
        assert!(!RecordView::confirm(&view, "Delete record 2?").await);
        // 输入结束视为拒绝
        assert!(!RecordView::confirm(&view, "Delete record 3?").await);
        assert!(buf.text().starts_with("Delete record 1? [y/N] "));
    }

    #[test]
    fn test_provider_table() {
        let page = Page::from_full_list(
            &[ProviderSummary {
                id: "3".into(),
                name: "cloudflare".into(),
                provider_type: 2,
                enabled: false,
                status: "ok".into(),
            }],
            &RecordQuery::new(1, 5, ""),
        );
        let text = format_resources(&ResourceSnapshot::from_page(&page, ""));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Providers");
        assert!(lines[1].starts_with("ID  NAME"));
        assert!(lines[2].contains("cloudflare"));
        assert!(lines[2].contains("no"));
    }
}
