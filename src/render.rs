//! PDF renderer – draws a [`Report`] as a right-to-left table using
//! `printpdf` (v0.8 ops-based API).
//!
//! The first column sits at the right edge and every cell is right-aligned.
//! Cell strings come from the session already shaped and isolated; this
//! module only measures and positions them.

use printpdf::*;

use crate::document::PdfDocumentHandle;
use crate::report::{Cell, Report};
use crate::session::ShapingSession;

const PT_TO_MM: f32 = 0.352778;
const CELL_PADDING: f32 = 4.0;
const TEXT_COLOR: [f32; 3] = [0.1, 0.1, 0.1];
const HEADER_FILL: [f32; 3] = [0.9, 0.92, 0.95];
const RULE_COLOR: [f32; 3] = [0.7, 0.7, 0.7];

/// Page geometry and type size for the table.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin: f32,
    pub font_size: f32,
    pub title_size: f32,
    pub row_height: f32,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            margin: 40.0,
            font_size: 10.0,
            title_size: 16.0,
            row_height: 20.0,
        }
    }
}

impl TableLayout {
    /// Data rows that fit on one page below the title and header.
    pub fn rows_per_page(&self) -> usize {
        let usable = self.page_height_pt
            - 2.0 * self.margin
            - self.title_block_height()
            - self.row_height;
        ((usable / self.row_height).floor() as usize).max(1)
    }

    fn title_block_height(&self) -> f32 {
        self.title_size * 2.0
    }

    fn column_width(&self, columns: usize) -> f32 {
        (self.page_width_pt - 2.0 * self.margin) / columns.max(1) as f32
    }

    /// Right edge of column `index` (0 = rightmost).
    fn column_right(&self, index: usize, columns: usize) -> f32 {
        self.page_width_pt - self.margin - index as f32 * self.column_width(columns)
    }
}

/// Render `report` into `doc` and return `(pdf_bytes, page_count)`.
pub fn render_report(
    report: &Report,
    session: &ShapingSession,
    doc: PdfDocumentHandle,
    layout: &TableLayout,
) -> (Vec<u8>, usize) {
    let page_w = Mm(layout.page_width_pt * PT_TO_MM);
    let page_h = Mm(layout.page_height_pt * PT_TO_MM);
    let columns = report.column_count();

    let title = session.shape(&report.title);
    let header: Vec<String> = report.columns.iter().map(|c| session.shape(c)).collect();

    let mut pages = Vec::new();
    let chunks: Vec<&[Vec<Cell>]> = if report.rows.is_empty() {
        vec![&report.rows[..]]
    } else {
        report.rows.chunks(layout.rows_per_page()).collect()
    };

    for chunk in chunks {
        let mut ops = Vec::new();
        let mut y = layout.margin;

        // Title, right-aligned.
        let title_w = doc.measure(&title, layout.title_size);
        let baseline = y + doc.metrics().ascender_pt(layout.title_size);
        ops.extend(doc.text_ops(
            &title,
            layout.page_width_pt - layout.margin - title_w,
            layout.page_height_pt - baseline,
            layout.title_size,
            TEXT_COLOR,
        ));
        y += layout.title_block_height();

        if !header.is_empty() {
            ops.extend(fill_rect(
                layout.margin,
                layout.page_height_pt - y - layout.row_height,
                layout.page_width_pt - 2.0 * layout.margin,
                layout.row_height,
                HEADER_FILL,
            ));
            draw_row(&mut ops, &doc, &header, y, columns, layout);
            y += layout.row_height;
        }

        for row in chunk {
            let cells: Vec<String> = row.iter().map(|c| c.render(session)).collect();
            draw_row(&mut ops, &doc, &cells, y, columns, layout);
            y += layout.row_height;
            ops.extend(rule(
                layout.margin,
                layout.page_width_pt - layout.margin,
                layout.page_height_pt - y,
            ));
        }

        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    let count = pages.len();
    (doc.finish(pages), count)
}

/// Right-align each cell inside its column; `top` is measured from the page top.
fn draw_row(
    ops: &mut Vec<Op>,
    doc: &PdfDocumentHandle,
    cells: &[String],
    top: f32,
    columns: usize,
    layout: &TableLayout,
) {
    let col_w = layout.column_width(columns);
    // Vertically centre the text in the row.
    let ascender = doc.metrics().ascender_pt(layout.font_size);
    let baseline = top + (layout.row_height - layout.font_size) / 2.0 + ascender;

    for (index, text) in cells.iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        let right = layout.column_right(index, columns) - CELL_PADDING;
        let left = right - col_w + 2.0 * CELL_PADDING;
        let width = doc.measure(text, layout.font_size);
        let x = (right - width).max(left);
        ops.extend(doc.text_ops(
            text,
            x,
            layout.page_height_pt - baseline,
            layout.font_size,
            TEXT_COLOR,
        ));
    }
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Filled rectangle with its bottom-left corner at (`x`, `y`) in PDF space.
fn fill_rect(x: f32, y: f32, w: f32, h: f32, color: [f32; 3]) -> Vec<Op> {
    vec![
        Op::SetFillColor {
            col: Color::Rgb(Rgb {
                r: color[0],
                g: color[1],
                b: color[2],
                icc_profile: None,
            }),
        },
        Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        point(x, y),
                        point(x + w, y),
                        point(x + w, y + h),
                        point(x, y + h),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        },
    ]
}

/// Horizontal hairline at PDF height `y`.
fn rule(x1: f32, x2: f32, y: f32) -> Vec<Op> {
    vec![
        Op::SetOutlineColor {
            col: Color::Rgb(Rgb {
                r: RULE_COLOR[0],
                g: RULE_COLOR[1],
                b: RULE_COLOR[2],
                icc_profile: None,
            }),
        },
        Op::SetOutlineThickness { pt: Pt(0.5) },
        Op::DrawLine {
            line: Line {
                points: vec![point(x1, y), point(x2, y)],
                is_closed: false,
            },
        },
    ]
}
