use crate::alert::is_hot;
use crate::export::LogEntry;
use crate::metrics::Column;
use crate::summary::ReportSummary;

/// Usable width of an A4 page with 10 mm margins.
pub const CONTENT_WIDTH_MM: f32 = 190.0;

const SUMMARY_WIDTHS: [f32; 3] = [60.0, 60.0, 70.0];
const TABLE_WIDTHS: [f32; 7] = [18.0, 18.0, 20.0, 25.0, 18.0, 30.0, 30.0];
const TABLE_HEADERS: [&str; 7] = [
    "Time", "CPU%", "Temp°C", "RAM(GB)", "Ping(ms)", "DL(Mbps)", "UL(Mbps)",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// Text colour of a single cell. Each cell carries its own, so a highlighted
/// value cannot bleed into its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Alert,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub width: f32,
    pub text: String,
    pub align: Align,
    pub tone: Tone,
    pub bordered: bool,
}

impl Cell {
    fn boxed(width: f32, text: impl Into<String>, align: Align) -> Self {
        Self {
            width,
            text: text.into(),
            align,
            tone: Tone::Normal,
            bordered: true,
        }
    }

    fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub height: f32,
    pub style: FontStyle,
    pub size: f32,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Unbordered, centred line spanning the page.
    Banner { text: String, style: FontStyle, size: f32 },
    /// Bordered full-width heading.
    Section(String),
    Row(Row),
    /// Repeated at the top of every page the table continues on.
    TableHeader(Row),
    Gap(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub blocks: Vec<Block>,
}

pub fn build_layout(summary: &ReportSummary, entries: &[LogEntry]) -> ReportLayout {
    let date = summary.date.format("%Y-%m-%d").to_string();
    let a = &summary.averages;
    let s = &summary.storage;

    let mut blocks = vec![
        Block::Banner {
            text: "SERVER MONITORING REPORT".to_string(),
            style: FontStyle::Bold,
            size: 16.0,
        },
        Block::Banner {
            text: format!("Date: {date}"),
            style: FontStyle::Italic,
            size: 10.0,
        },
        Block::Gap(5.0),
        Block::Section("1. Daily Average Summary (24h)".to_string()),
        Block::Gap(2.0),
        summary_row([
            format!("CPU: {:.1}%", a.cpu_percent),
            format!("Temp: {:.1}°C", a.temp_celsius),
            format!("RAM: {:.2} GB", a.ram_gb),
        ]),
        summary_row([
            format!("Storage: {:.2}/{:.2} GB", s.used_gb, s.total_gb),
            format!("Disk Usage: {:.1}%", s.percent),
            String::new(),
        ]),
        summary_row([
            format!("Download: {:.1} Mbps", a.download_mbps),
            format!("Upload: {:.1} Mbps", a.upload_mbps),
            format!("Ping: {:.0} ms", a.ping_ms),
        ]),
        Block::Gap(8.0),
        Block::Section("2. Hourly Detail".to_string()),
        Block::Gap(2.0),
        Block::TableHeader(Row {
            height: 8.0,
            style: FontStyle::Bold,
            size: 9.0,
            cells: TABLE_WIDTHS
                .iter()
                .zip(TABLE_HEADERS)
                .map(|(w, h)| Cell::boxed(*w, h, Align::Center))
                .collect(),
        }),
    ];

    blocks.extend(entries.iter().map(|e| Block::Row(table_row(e))));

    ReportLayout {
        title: format!("Server Report {date}"),
        blocks,
    }
}

fn summary_row(texts: [String; 3]) -> Block {
    Block::Row(Row {
        height: 8.0,
        style: FontStyle::Regular,
        size: 10.0,
        cells: SUMMARY_WIDTHS
            .iter()
            .zip(texts)
            .map(|(w, t)| Cell::boxed(*w, t, Align::Left))
            .collect(),
    })
}

fn table_row(entry: &LogEntry) -> Row {
    let temp_tone = match entry.value(Column::Temp) {
        Some(t) if is_hot(t) => Tone::Alert,
        _ => Tone::Normal,
    };
    let ping = entry
        .value(Column::Ping)
        .map(|p| format!("{p:.0} ms"))
        .unwrap_or_else(|| entry.raw(Column::Ping).to_string());

    let texts = [
        entry.raw(Column::Time).to_string(),
        format!("{}%", entry.raw(Column::Cpu)),
        format!("{}°C", entry.raw(Column::Temp)),
        format!("{} GB", entry.raw(Column::Ram)),
        ping,
        format!("{} Mbps", entry.raw(Column::Download)),
        format!("{} Mbps", entry.raw(Column::Upload)),
    ];

    let cells = TABLE_WIDTHS
        .iter()
        .zip(texts)
        .enumerate()
        .map(|(i, (w, t))| {
            let cell = Cell::boxed(*w, t, Align::Center);
            if i == Column::Temp.index() {
                cell.with_tone(temp_tone)
            } else {
                cell
            }
        })
        .collect();

    Row {
        height: 8.0,
        style: FontStyle::Regular,
        size: 9.0,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::StorageSummary;
    use chrono::NaiveDate;

    fn entries() -> Vec<LogEntry> {
        vec![
            LogEntry::new(["09:00", "50.0", "55.0", "4.00", "20.0", "100.00", "10.00"]),
            LogEntry::new(["10:00", "60.0", "65.0", "5.00", "30.0", "120.00", "12.00"]),
        ]
    }

    fn layout_for(entries: &[LogEntry]) -> ReportLayout {
        let storage = StorageSummary {
            total_gb: 117.18,
            used_gb: 23.4,
            percent: 20.0,
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        build_layout(&ReportSummary::new(date, entries, storage), entries)
    }

    fn all_rows(layout: &ReportLayout) -> impl Iterator<Item = &Row> {
        layout.blocks.iter().filter_map(|b| match b {
            Block::Row(row) | Block::TableHeader(row) => Some(row),
            _ => None,
        })
    }

    /// Body rows of the detail table, one per log entry.
    fn table_rows(layout: &ReportLayout) -> Vec<&Row> {
        layout
            .blocks
            .iter()
            .skip_while(|b| !matches!(b, Block::TableHeader(_)))
            .filter_map(|b| match b {
                Block::Row(row) => Some(row),
                _ => None,
            })
            .collect()
    }

    fn texts(row: &Row) -> Vec<&str> {
        row.cells.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn hot_temperature_flags_only_that_cell() {
        let layout = layout_for(&entries());
        let rows = table_rows(&layout);
        assert_eq!(rows.len(), 2);

        let tones: Vec<Vec<Tone>> = rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.tone).collect())
            .collect();
        assert!(tones[0].iter().all(|t| *t == Tone::Normal));
        assert_eq!(tones[1][2], Tone::Alert);
        assert_eq!(
            tones[1].iter().filter(|t| **t == Tone::Alert).count(),
            1,
            "flag must not leak into neighbouring cells"
        );
    }

    #[test]
    fn table_cells_carry_units() {
        let layout = layout_for(&entries());
        assert_eq!(
            texts(table_rows(&layout)[0]),
            vec!["09:00", "50.0%", "55.0°C", "4.00 GB", "20 ms", "100.00 Mbps", "10.00 Mbps"]
        );
    }

    #[test]
    fn summary_rows_use_fixed_precision() {
        let layout = layout_for(&entries());
        let rows: Vec<Vec<&str>> = all_rows(&layout).take(3).map(texts).collect();
        assert_eq!(rows[0], vec!["CPU: 55.0%", "Temp: 60.0°C", "RAM: 4.50 GB"]);
        assert_eq!(rows[1], vec!["Storage: 23.40/117.18 GB", "Disk Usage: 20.0%", ""]);
        assert_eq!(rows[2], vec!["Download: 110.0 Mbps", "Upload: 11.0 Mbps", "Ping: 25 ms"]);
    }

    #[test]
    fn empty_log_still_renders_header() {
        let layout = layout_for(&[]);
        assert!(table_rows(&layout).is_empty());
        assert!(layout
            .blocks
            .iter()
            .any(|b| matches!(b, Block::TableHeader(r) if r.cells.len() == 7)));
        assert_eq!(texts(all_rows(&layout).next().unwrap())[0], "CPU: 0.0%");
    }

    #[test]
    fn unparsable_values_render_raw() {
        let bad = vec![LogEntry::new(["11:00", "x", "hot", "5.00", "n/a", "1.00", "1.00"])];
        let layout = layout_for(&bad);
        let row = table_rows(&layout)[0];
        assert_eq!(row.cells[2].text, "hot°C");
        assert_eq!(row.cells[2].tone, Tone::Normal);
        assert_eq!(row.cells[4].text, "n/a");
    }
}
