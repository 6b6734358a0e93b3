//! Report generation tools
//!
//! Generate a PDF nutrition report with a daily table and trend charts.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::FixedOffset;
use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;

use crate::db::Database;
use crate::nutrition::{summarize_range, DayTotals};
use crate::tools::profile::{load_profile, ProfileResponse};
use crate::tools::progress::{load_range, parse_date};

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (0, 112, 60);
const COLOR_ON_TARGET: (u8, u8, u8) = (0, 176, 80);
const COLOR_SLIGHTLY_OVER: (u8, u8, u8) = (255, 165, 0);
const COLOR_OVER: (u8, u8, u8) = (255, 0, 0);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

/// Percent of goal above which a day counts as well over
const OVER_GOAL_PERCENT: f64 = 110.0;

// Letter size, mm
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 15.0;

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub total_meals: usize,
    pub days_analyzed: usize,
    pub days_logged: usize,
    pub date_range: String,
    pub message: String,
}

/// Classify a day's calories against the goal
pub fn classify_intake(calories: f64, calorie_goal: i64) -> (&'static str, (u8, u8, u8)) {
    if calorie_goal <= 0 {
        return ("No goal", COLOR_BLACK);
    }
    let percent = calories / calorie_goal as f64 * 100.0;
    if percent <= 100.0 {
        ("On target", COLOR_ON_TARGET)
    } else if percent <= OVER_GOAL_PERCENT {
        ("Slightly over", COLOR_SLIGHTLY_OVER)
    } else {
        ("Over", COLOR_OVER)
    }
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

fn date_label(days: &[DayTotals], x: i32) -> String {
    usize::try_from(x)
        .ok()
        .and_then(|i| days.get(i))
        .map(|d| d.date.format("%m/%d").to_string())
        .unwrap_or_default()
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, String> {
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Daily calories against the goal line, as PNG bytes
pub fn generate_calorie_chart(
    days: &[DayTotals],
    calorie_goal: Option<i64>,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if days.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let peak = days
            .iter()
            .map(|d| d.totals.calories)
            .fold(calorie_goal.unwrap_or(0) as f64, f64::max);
        let y_max = (peak * 1.1).max(100.0);
        let n = days.len() as i32;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..n, 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(days.len().min(10))
            .x_label_formatter(&|x| date_label(days, *x))
            .y_desc("kcal")
            .draw()
            .map_err(|e| e.to_string())?;

        if let Some(goal) = calorie_goal {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0, goal as f64), (n, goal as f64)],
                    ShapeStyle::from(&RGBColor(255, 0, 0).mix(0.6)).stroke_width(2),
                )))
                .map_err(|e| e.to_string())?
                .label("Goal")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(255, 0, 0).stroke_width(2))
                });
        }

        let points: Vec<(i32, f64)> = days
            .iter()
            .enumerate()
            .map(|(i, d)| (i as i32, d.totals.calories))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), GREEN.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Calories")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.stroke_width(2)));

        chart
            .draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, GREEN.filled())))
            .map_err(|e| e.to_string())?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    encode_png(buffer, width, height)
}

/// Daily protein, carbs and fat grams, as PNG bytes
pub fn generate_macro_chart(days: &[DayTotals], width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if days.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let peak = days
            .iter()
            .flat_map(|d| [d.totals.protein_g, d.totals.carbs_g, d.totals.fat_g])
            .fold(0.0, f64::max);
        let y_max = (peak * 1.1).max(10.0);
        let n = days.len() as i32;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..n, 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(days.len().min(10))
            .x_label_formatter(&|x| date_label(days, *x))
            .y_desc("grams")
            .draw()
            .map_err(|e| e.to_string())?;

        let series: [(&str, RGBColor, fn(&DayTotals) -> f64); 3] = [
            ("Protein", RGBColor(192, 0, 0), |d| d.totals.protein_g),
            ("Carbs", RGBColor(0, 112, 192), |d| d.totals.carbs_g),
            ("Fat", RGBColor(255, 165, 0), |d| d.totals.fat_g),
        ];

        for (label, color, value) in series {
            let points: Vec<(i32, f64)> = days
                .iter()
                .enumerate()
                .map(|(i, d)| (i as i32, value(d)))
                .collect();

            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(|e| e.to_string())?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    encode_png(buffer, width, height)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(layer: &PdfLayerReference, x1: Mm, y1: Mm, x2: Mm, y2: Mm, color: (u8, u8, u8), width: f32) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![(Point::new(x1, y1), false), (Point::new(x2, y2), false)],
        is_closed: false,
    };
    layer.add_line(line);
}

/// Embed a chart, or an error line if it could not be drawn; returns the new y
fn add_chart(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    chart: Result<Vec<u8>, String>,
    y: f32,
) -> Result<f32, String> {
    match chart {
        Ok(png_bytes) => {
            let dynamic_image =
                printpdf::image_crate::load_from_memory(&png_bytes).map_err(|e| e.to_string())?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            // 1000x320 pixels at 120 DPI is about 212mm x 68mm
            let transform = ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(y - 70.0)),
                dpi: Some(120.0),
                ..Default::default()
            };

            pdf_image.add_to_layer(layer.clone(), transform);
            Ok(y - 76.0)
        }
        Err(e) => {
            tracing::warn!(error = %e, "chart generation failed");
            add_text(layer, font, &format!("Chart generation error: {}", e), Mm(MARGIN), Mm(y - 10.0), 9.0, COLOR_OVER);
            Ok(y - 15.0)
        }
    }
}

fn profile_lines(profile: &ProfileResponse) -> [String; 2] {
    let p = &profile.profile.profile;
    let t = &profile.targets;
    [
        format!(
            "Profile: {:.1} kg, {:.0} cm, {} y, {}, {} activity, goal {}",
            p.weight_kg, p.height_cm, p.age_years, p.sex, p.activity_level, p.goal
        ),
        format!(
            "Targets: {} kcal/day (BMR {:.0}, TDEE {:.0}), protein {} g, carbs {} g, fat {} g",
            t.calorie_goal, t.bmr, t.tdee, t.protein_target_g, t.carbs_target_g, t.fat_target_g
        ),
    ]
}

// ============================================================================
// Nutrition Report Generation
// ============================================================================

/// Generate a nutrition PDF report for an inclusive date range
pub fn generate_nutrition_report(
    db: &Database,
    start_date: &str,
    end_date: &str,
    output_path: &str,
    tz: &FixedOffset,
) -> Result<GenerateReportResponse, String> {
    let start_day = parse_date(start_date)?;
    let end_day = parse_date(end_date)?;

    let conn = db.get_conn().map_err(|e| e.to_string())?;
    let profile = load_profile(&conn)?;
    let days = load_range(&conn, start_day, end_day, tz)?;
    let summary = summarize_range(&days);

    if summary.days_logged == 0 {
        return Err(format!("No meals found between {} and {}", start_date, end_date));
    }

    let calorie_goal = profile.as_ref().map(|p| p.targets.calorie_goal);
    let total_meals = summary.totals.meal_count;

    // Page 1 - Portrait summary and daily table
    let (doc, page1, layer1) =
        PdfDocument::new("Nutrition Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| e.to_string())?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = PAGE_HEIGHT - 20.0;

    add_text(&layer, &font_bold, "Nutrition Report", Mm(MARGIN), Mm(y), 18.0, COLOR_TITLE);
    y -= 10.0;

    add_text(&layer, &font, &format!("Report Period: {} to {}", start_day, end_day), Mm(MARGIN), Mm(y), 11.0, COLOR_BLACK);
    let now = chrono::Utc::now().with_timezone(tz).format("%Y-%m-%d").to_string();
    add_text(&layer, &font, &format!("Generated: {}", now), Mm(120.0), Mm(y), 11.0, COLOR_BLACK);
    y -= 6.0;

    match &profile {
        Some(p) => {
            for line in profile_lines(p) {
                add_text(&layer, &font, &line, Mm(MARGIN), Mm(y), 10.0, COLOR_BLACK);
                y -= 6.0;
            }
        }
        None => {
            add_text(&layer, &font, "No profile set; progress against goals is not shown.", Mm(MARGIN), Mm(y), 10.0, COLOR_GRAY);
            y -= 6.0;
        }
    }
    y -= 4.0;

    add_line(&layer, Mm(MARGIN), Mm(y), Mm(PAGE_WIDTH - MARGIN), Mm(y), COLOR_GRAY, 0.5);
    y -= 8.0;

    // Summary section
    add_text(&layer, &font_bold, "Summary", Mm(MARGIN), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    add_text(&layer, &font, &format!("Meals Logged: {}", total_meals), Mm(MARGIN), Mm(y), 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Days Logged: {} of {}", summary.days_logged, summary.days), Mm(80.0), Mm(y), 10.0, COLOR_BLACK);
    y -= 6.0;

    let avg = &summary.daily_average;
    add_text(&layer, &font, &format!("Average Calories: {:.0} kcal/day", avg.calories), Mm(MARGIN), Mm(y), 10.0, COLOR_BLACK);
    if let Some(goal) = calorie_goal {
        let (classification, color) = classify_intake(avg.calories, goal);
        add_text(&layer, &font, &format!("Versus Goal: {} ({} kcal)", classification, goal), Mm(80.0), Mm(y), 10.0, color);
    }
    y -= 6.0;

    add_text(
        &layer,
        &font,
        &format!(
            "Average Macros: protein {:.0} g, carbs {:.0} g, fat {:.0} g",
            avg.protein_g, avg.carbs_g, avg.fat_g
        ),
        Mm(MARGIN),
        Mm(y),
        10.0,
        COLOR_BLACK,
    );
    y -= 12.0;

    // Daily table
    add_text(&layer, &font_bold, "Daily Totals", Mm(MARGIN), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [24.0, 14.0, 14.0, 24.0, 22.0, 22.0, 22.0, 20.0];
    let headers = ["Date", "Day", "Meals", "Calories", "Protein", "Carbs", "Fat", "% Goal"];

    let draw_header = |layer: &PdfLayerReference, y: f32| {
        let mut col_x = MARGIN;
        for (i, header) in headers.iter().enumerate() {
            add_text(layer, &font_bold, header, Mm(col_x), Mm(y), 8.0, COLOR_BLACK);
            col_x += col_widths[i];
        }
    };

    draw_header(&layer, y);
    y -= 5.0;

    for day in &days {
        if y < 20.0 {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table Page");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT - 20.0;
            draw_header(&layer, y);
            y -= 5.0;
        }

        let t = &day.totals;
        let (percent, row_color) = match calorie_goal {
            Some(goal) if goal > 0 && !t.is_empty() => (
                format!("{:.0}%", t.calories / goal as f64 * 100.0),
                classify_intake(t.calories, goal).1,
            ),
            _ => ("-".to_string(), COLOR_BLACK),
        };
        let row_color = if t.is_empty() { COLOR_GRAY } else { row_color };

        let values = [
            day.date.to_string(),
            day.date.format("%a").to_string(),
            t.meal_count.to_string(),
            format!("{:.0}", t.calories),
            format!("{:.0} g", t.protein_g),
            format!("{:.0} g", t.carbs_g),
            format!("{:.0} g", t.fat_g),
            percent,
        ];

        let mut col_x = MARGIN;
        for (i, value) in values.iter().enumerate() {
            let color = if i == 3 || i == 7 { row_color } else { COLOR_BLACK };
            add_text(&layer, &font, value, Mm(col_x), Mm(y), 7.0, color);
            col_x += col_widths[i];
        }
        y -= 4.5;
    }

    // Chart page - Landscape
    let (chart_page, chart_layer) = doc.add_page(Mm(PAGE_HEIGHT), Mm(PAGE_WIDTH), "Chart Page");
    let chart_layer = doc.get_page(chart_page).get_layer(chart_layer);
    let mut y2 = PAGE_WIDTH - 15.0;

    add_text(&chart_layer, &font_bold, "Calorie Trend", Mm(MARGIN), Mm(y2), 14.0, COLOR_TITLE);
    add_text(&chart_layer, &font, &format!("{} - {}", start_day, end_day), Mm(120.0), Mm(y2), 11.0, COLOR_BLACK);
    y2 -= 4.0;
    y2 = add_chart(&chart_layer, &font, generate_calorie_chart(&days, calorie_goal, 1000, 320), y2)?;

    add_text(&chart_layer, &font_bold, "Macro Trend", Mm(MARGIN), Mm(y2), 14.0, COLOR_TITLE);
    y2 -= 4.0;
    add_chart(&chart_layer, &font, generate_macro_chart(&days, 1000, 320), y2)?;

    // Save PDF
    let path = Path::new(output_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    tracing::info!(path = output_path, days = summary.days, total_meals, "nutrition report written");

    Ok(GenerateReportResponse {
        success: true,
        file_path: output_path.to_string(),
        total_meals,
        days_analyzed: summary.days,
        days_logged: summary.days_logged,
        date_range: format!("{} to {}", start_day, end_day),
        message: format!(
            "Nutrition report generated with {} meals over {} days",
            total_meals, summary.days
        ),
    })
}
