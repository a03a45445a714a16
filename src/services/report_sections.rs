use crate::models::attendance::{AttendanceRecord, ReportRange, StaffMember};
use crate::models::document::{Align, ImageAsset, Rect, Rgb, TextStyle};
use crate::models::productivity::{DerivedMetrics, MonthPeriod, PerformanceTier};
use crate::models::settings::ClinicIdentity;
use crate::services::canvas::DocumentSurface;
use crate::services::pagination::{PageState, Paginator, ROW_RESERVE, SIDE_MARGIN};
use crate::utils::formatters::{
    format_calendar_date, format_compact, format_currency, format_date, format_date_time,
    format_decimal, format_national_id, format_percent, format_time, PLACEHOLDER,
};

pub const MAX_DETAIL_ROWS: usize = 10;
pub const ROW_HEIGHT: f32 = 18.0;
pub const DETAIL_COLUMNS: [&str; 5] = ["Date", "Clock in", "Clock out", "Hours", "Status"];

const HEADER_BAND_HEIGHT: f32 = 80.0;
const HEADER_BOTTOM: f32 = 165.0;
const LOGO_SIZE: f32 = 50.0;
const TITLE_HEIGHT: f32 = 24.0;
const SECTION_GAP: f32 = 14.0;
const CARD_HEIGHT: f32 = 60.0;
const CARD_GAP: f32 = 12.0;
const BADGE_WIDTH: f32 = 170.0;
const BADGE_HEIGHT: f32 = 22.0;
const NOTE_HEIGHT: f32 = 16.0;
const VALUE_OFFSET: f32 = 140.0;
const DETAIL_COLUMN_OFFSETS: [f32; 5] = [6.0, 116.0, 206.0, 296.0, 386.0];
const SPECIALTY_COUNT_OFFSET: f32 = 300.0;
const SPECIALTY_SHARE_OFFSET: f32 = 380.0;
const BAND_HEIGHT: f32 = 18.0;

pub struct HeaderContent<'a> {
    pub clinic: &'a ClinicIdentity,
    pub staff: &'a StaffMember,
    pub range: ReportRange,
    pub logo: Option<&'a ImageAsset>,
}

pub fn tier_color(tier: PerformanceTier) -> Rgb {
    match tier {
        PerformanceTier::Excellent => Rgb(22, 163, 74),
        PerformanceTier::Good => Rgb(37, 99, 235),
        PerformanceTier::Fair => Rgb(217, 119, 6),
        PerformanceTier::Low => Rgb(220, 38, 38),
    }
}

/// Clinic band, report title and period label. Always drawn at the top of
/// the first page.
pub fn render_header<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    content: &HeaderContent<'_>,
) -> PageState {
    let width = paginator.page_size().width;
    surface.fill_rect(Rect::new(0.0, 0.0, width, HEADER_BAND_HEIGHT), Rgb::BRAND);

    let mut text_x = SIDE_MARGIN;
    if let Some(logo) = content.logo {
        surface.image(logo, Rect::new(SIDE_MARGIN, 15.0, LOGO_SIZE, LOGO_SIZE));
        text_x += LOGO_SIZE + 12.0;
    }

    surface.text(
        &content.clinic.name,
        text_x,
        36.0,
        TextStyle::bold(16.0).color(Rgb::WHITE),
    );
    let contact: Vec<&str> = [
        content.clinic.address.as_deref(),
        content.clinic.phone.as_deref(),
        content.clinic.email.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect();
    if !contact.is_empty() {
        surface.text(
            &contact.join(" | "),
            text_x,
            54.0,
            TextStyle::regular(9.0).color(Rgb::WHITE),
        );
    }

    surface.text(
        "Attendance & Productivity Report (BETA)",
        SIDE_MARGIN,
        110.0,
        TextStyle::bold(15.0),
    );

    let mut staff_line = format!(
        "{}  |  ID: {}",
        content.staff.full_name(),
        format_national_id(content.staff.national_id.as_deref())
    );
    if let Some(specialty) = content.staff.specialty.as_deref() {
        staff_line.push_str(&format!("  |  {specialty}"));
    }
    surface.text(&staff_line, SIDE_MARGIN, 128.0, TextStyle::regular(10.0));

    surface.text(
        &format!(
            "Period: {} to {}",
            format_calendar_date(content.range.start),
            format_calendar_date(content.range.end)
        ),
        SIDE_MARGIN,
        143.0,
        TextStyle::regular(10.0).color(Rgb::MUTED),
    );
    surface.line((SIDE_MARGIN, 152.0), (width - SIDE_MARGIN, 152.0), Rgb::RULE);

    PageState::at(HEADER_BOTTOM, state.page_index)
}

/// Three equal cards: hours worked, patients attended, revenue.
pub fn render_kpi_grid<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    metrics: &DerivedMetrics,
) -> PageState {
    let height = TITLE_HEIGHT + CARD_HEIGHT + SECTION_GAP;
    let state = paginator.ensure_room(surface, state, height, ROW_RESERVE);
    let state = section_title(surface, state, "Executive Summary");

    let card_width = (paginator.content_width() - 2.0 * CARD_GAP) / 3.0;
    let cards = [
        (format_compact(metrics.total_hours_worked), "Hours worked"),
        (metrics.completed_appointments.to_string(), "Patients attended"),
        (format_currency(metrics.total_revenue), "Revenue"),
    ];

    for (index, (value, label)) in cards.iter().enumerate() {
        let x = SIDE_MARGIN + index as f32 * (card_width + CARD_GAP);
        let center = x + card_width / 2.0;
        surface.fill_rect(Rect::new(x, state.cursor, card_width, CARD_HEIGHT), Rgb::BRAND_LIGHT);
        surface.text(
            value,
            center,
            state.cursor + 28.0,
            TextStyle::bold(18.0).color(Rgb::BRAND).align(Align::Center),
        );
        surface.text(
            label,
            center,
            state.cursor + 46.0,
            TextStyle::regular(9.0).color(Rgb::MUTED).align(Align::Center),
        );
    }

    state.advance(CARD_HEIGHT + SECTION_GAP)
}

/// Six productivity indicators followed by the tier badge.
pub fn render_productivity_block<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    metrics: &DerivedMetrics,
) -> PageState {
    let pairs = [
        (
            "Scheduled appointments".to_string(),
            metrics.scheduled_appointments.to_string(),
        ),
        (
            "Completed appointments".to_string(),
            metrics.completed_appointments.to_string(),
        ),
        (
            "Attendance rate".to_string(),
            format_percent(metrics.attendance_rate),
        ),
        (
            "Patients per hour".to_string(),
            format_decimal(metrics.patients_per_hour, 2),
        ),
        (
            "Revenue per hour".to_string(),
            format_currency(metrics.revenue_per_hour),
        ),
        (
            "Revenue per visit".to_string(),
            format_currency(metrics.revenue_per_visit),
        ),
    ];

    let height = TITLE_HEIGHT + pair_rows_height(pairs.len()) + 6.0 + BADGE_HEIGHT + SECTION_GAP;
    let state = paginator.ensure_room(surface, state, height, ROW_RESERVE);
    let state = section_title(surface, state, "Clinical Productivity");
    let state = metric_pairs(surface, paginator, state, &pairs).advance(6.0);

    let tier = metrics.performance_tier;
    surface.fill_rect(
        Rect::new(SIDE_MARGIN, state.cursor, BADGE_WIDTH, BADGE_HEIGHT),
        tier_color(tier),
    );
    surface.text(
        &format!("Performance: {}", tier.label()),
        SIDE_MARGIN + 8.0,
        state.cursor + 15.0,
        TextStyle::bold(10.0).color(Rgb::WHITE),
    );

    state.advance(BADGE_HEIGHT + SECTION_GAP)
}

/// Consultations per specialty, largest first. Draws nothing for an empty
/// mapping.
pub fn render_specialty_block<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    metrics: &DerivedMetrics,
) -> PageState {
    let shares = metrics.specialties_by_count();
    if shares.is_empty() {
        return state;
    }

    let state = paginator.ensure_room(surface, state, TITLE_HEIGHT + ROW_HEIGHT, ROW_RESERVE);
    let state = section_title(surface, state, "Specialty Distribution");

    let state = paginator.emit_rows(
        surface,
        state,
        &shares,
        ROW_HEIGHT,
        |_, state| state,
        |surface, state, _, share| {
            let baseline = state.cursor + 12.0;
            surface.text(share.name, SIDE_MARGIN, baseline, TextStyle::regular(9.0));
            surface.text(
                &share.count.to_string(),
                SIDE_MARGIN + SPECIALTY_COUNT_OFFSET,
                baseline,
                TextStyle::bold(9.0).align(Align::Right),
            );
            surface.text(
                &format_percent(metrics.specialty_percentage(share.count)),
                SIDE_MARGIN + SPECIALTY_SHARE_OFFSET,
                baseline,
                TextStyle::regular(9.0).color(Rgb::MUTED).align(Align::Right),
            );
        },
    );

    state.advance(SECTION_GAP)
}

/// Planned versus worked hours.
pub fn render_compliance_block<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    metrics: &DerivedMetrics,
) -> PageState {
    let balance_label = if metrics.is_overtime() {
        "Overtime"
    } else {
        "Shortfall"
    };
    let pairs = [
        (
            "Scheduled hours (est.)".to_string(),
            format!("{} h", format_decimal(metrics.scheduled_hours, 1)),
        ),
        (
            "Worked hours".to_string(),
            format!("{} h", format_decimal(metrics.total_hours_worked, 1)),
        ),
        (
            "Compliance rate".to_string(),
            format_percent(metrics.compliance_rate),
        ),
        (
            balance_label.to_string(),
            format!("{} h", format_decimal(metrics.overtime_hours.abs(), 1)),
        ),
    ];

    let height = TITLE_HEIGHT + pair_rows_height(pairs.len()) + SECTION_GAP;
    let state = paginator.ensure_room(surface, state, height, ROW_RESERVE);
    let state = section_title(surface, state, "Schedule Compliance");
    metric_pairs(surface, paginator, state, &pairs).advance(SECTION_GAP)
}

/// Up to [`MAX_DETAIL_ROWS`] records with the column header repeated on
/// every page the table reaches, plus a note when records were left out.
pub fn render_detail_table<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    records: &[AttendanceRecord],
) -> PageState {
    let state = paginator.ensure_room(surface, state, TITLE_HEIGHT + 2.0 * ROW_HEIGHT, ROW_RESERVE);
    let state = section_title(surface, state, "Attendance Detail");
    let state = detail_header(surface, paginator, state);

    let shown = &records[..records.len().min(MAX_DETAIL_ROWS)];
    let state = paginator.emit_rows(
        surface,
        state,
        shown,
        ROW_HEIGHT,
        |surface, state| detail_header(surface, paginator, state),
        |surface, state, index, record| detail_row(surface, paginator, state, index, record),
    );

    if records.len() > MAX_DETAIL_ROWS {
        let state = paginator.ensure_room(surface, state, NOTE_HEIGHT, ROW_RESERVE);
        surface.text(
            &overflow_note(shown.len(), records.len()),
            SIDE_MARGIN,
            state.cursor + 11.0,
            TextStyle::italic(8.0).color(Rgb::MUTED),
        );
        return state.advance(NOTE_HEIGHT);
    }

    state
}

pub fn overflow_note(shown: usize, total: usize) -> String {
    format!("Showing {shown} of {total} asistencias registered in the period.")
}

/// Closing line naming the month the productivity figures were taken from.
pub fn render_closing_note<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    period: MonthPeriod,
    degraded: bool,
) -> PageState {
    let mut note = format!(
        "Productivity figures cover {:02}/{} (current calendar month).",
        period.month, period.year
    );
    if degraded {
        note.push_str(" Productivity data was unavailable; figures shown as zero.");
    }

    let state = paginator.ensure_room(surface, state.advance(6.0), NOTE_HEIGHT, ROW_RESERVE);
    surface.text(
        &note,
        SIDE_MARGIN,
        state.cursor + 11.0,
        TextStyle::italic(8.0).color(Rgb::MUTED),
    );
    state.advance(NOTE_HEIGHT)
}

/// Generation stamp above the bottom band of the first page. Leaves the
/// last page selected.
pub fn render_footer<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    clinic: &ClinicIdentity,
    generated_at: chrono::DateTime<chrono::Utc>,
) {
    let size = paginator.page_size();
    surface.select_page(0);
    surface.text(
        &format!(
            "Generated on {} | {} | BETA",
            format_date_time(generated_at),
            clinic.name
        ),
        SIDE_MARGIN,
        size.height - BAND_HEIGHT - 8.0,
        TextStyle::regular(8.0).color(Rgb::MUTED),
    );
    let last = surface.page_count() - 1;
    surface.select_page(last);
}

/// Decorative band with page numbering at the bottom of every page.
pub fn render_page_bands<S: DocumentSurface + ?Sized>(surface: &mut S, paginator: &Paginator) {
    let size = paginator.page_size();
    let total = surface.page_count();
    for index in 0..total {
        surface.select_page(index);
        surface.fill_rect(
            Rect::new(0.0, size.height - BAND_HEIGHT, size.width, BAND_HEIGHT),
            Rgb::BRAND,
        );
        surface.text(
            &format!("Page {} of {}", index + 1, total),
            size.width - SIDE_MARGIN,
            size.height - 6.0,
            TextStyle::regular(8.0).color(Rgb::WHITE).align(Align::Right),
        );
    }
    surface.select_page(total - 1);
}

fn section_title<S: DocumentSurface + ?Sized>(surface: &mut S, state: PageState, title: &str) -> PageState {
    surface.text(title, SIDE_MARGIN, state.cursor + 14.0, TextStyle::bold(12.0).color(Rgb::BRAND));
    state.advance(TITLE_HEIGHT)
}

fn pair_rows_height(pairs: usize) -> f32 {
    pairs.div_ceil(2) as f32 * ROW_HEIGHT
}

/// Label/value pairs laid out two per row.
fn metric_pairs<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    mut state: PageState,
    pairs: &[(String, String)],
) -> PageState {
    let column_width = paginator.content_width() / 2.0;
    for row in pairs.chunks(2) {
        for (column, (label, value)) in row.iter().enumerate() {
            let x = SIDE_MARGIN + column as f32 * column_width;
            let baseline = state.cursor + 12.0;
            surface.text(label, x, baseline, TextStyle::regular(9.0).color(Rgb::MUTED));
            surface.text(value, x + VALUE_OFFSET, baseline, TextStyle::bold(10.0));
        }
        state = state.advance(ROW_HEIGHT);
    }
    state
}

fn detail_header<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
) -> PageState {
    surface.fill_rect(
        Rect::new(SIDE_MARGIN, state.cursor, paginator.content_width(), ROW_HEIGHT),
        Rgb::BRAND,
    );
    for (title, offset) in DETAIL_COLUMNS.iter().zip(DETAIL_COLUMN_OFFSETS) {
        surface.text(
            title,
            SIDE_MARGIN + offset,
            state.cursor + 12.0,
            TextStyle::bold(9.0).color(Rgb::WHITE),
        );
    }
    state.advance(ROW_HEIGHT)
}

fn detail_row<S: DocumentSurface + ?Sized>(
    surface: &mut S,
    paginator: &Paginator,
    state: PageState,
    index: usize,
    record: &AttendanceRecord,
) {
    if index % 2 == 1 {
        surface.fill_rect(
            Rect::new(SIDE_MARGIN, state.cursor, paginator.content_width(), ROW_HEIGHT),
            Rgb::ROW_SHADE,
        );
    }

    let cells = detail_cells(record);
    for (cell, offset) in cells.iter().zip(DETAIL_COLUMN_OFFSETS) {
        surface.text(
            cell,
            SIDE_MARGIN + offset,
            state.cursor + 12.0,
            TextStyle::regular(9.0),
        );
    }
}

pub fn detail_cells(record: &AttendanceRecord) -> [String; 5] {
    [
        format_date(record.reference_time()),
        format_time(record.clock_in),
        format_time(record.clock_out),
        record
            .duration_hours()
            .map(|hours| format_decimal(hours, 2))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        record.status().label().to_string(),
    ]
}
