use std::cell::RefCell;

use richmark::{atomize, parse_runs};
use richmark_render::{
    layout, measure, render, DrawSurface, HAlign, HeuristicMeasurer, LayoutEngine, LineWrapper,
    Rect, TextMeasurer, TextRequest, VAlign,
};

/// Words are half an em per char; whitespace is a wide 3em gap.
struct WideGapMeasurer;

impl TextMeasurer for WideGapMeasurer {
    fn measure_text_px(&self, text: &str, pixel_size: u32, _font_family: &str) -> f32 {
        if text.chars().all(char::is_whitespace) {
            pixel_size as f32 * 3.0
        } else {
            text.chars().count() as f32 * pixel_size as f32 * 0.5
        }
    }
}

/// Records every string it is asked to measure.
#[derive(Default)]
struct RecordingMeasurer {
    seen: RefCell<Vec<(String, u32)>>,
}

impl TextMeasurer for RecordingMeasurer {
    fn measure_text_px(&self, text: &str, pixel_size: u32, _font_family: &str) -> f32 {
        self.seen.borrow_mut().push((text.to_string(), pixel_size));
        text.chars().count() as f32 * pixel_size as f32
    }
}

/// Surface that keeps the fill color in effect for each painted text.
#[derive(Default)]
struct ColorCapture {
    fill: String,
    painted: Vec<(String, String)>,
    depth: usize,
}

impl DrawSurface for ColorCapture {
    type Error = core::convert::Infallible;

    fn save(&mut self) {
        self.depth += 1;
    }

    fn restore(&mut self) {
        self.depth -= 1;
    }

    fn scale(&mut self, _factor: f32) {}

    fn set_font(&mut self, _pixel_size: u32, _font_family: &str) {}

    fn set_fill_color(&mut self, color: &str) {
        self.fill = color.to_string();
    }

    fn alpha(&self) -> f32 {
        1.0
    }

    fn set_alpha(&mut self, _alpha: f32) {}

    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn fill_text(&mut self, text: &str, _x: f32, _y: f32) -> Result<(), Self::Error> {
        self.painted.push((text.to_string(), self.fill.clone()));
        Ok(())
    }
}

#[test]
fn end_to_end_styled_word_wraps_onto_two_lines() {
    // "Hi" at 20px = 20, gap at 10px = 30, "there" at 10px = 25.
    let req = TextRequest::new(
        "[fg=red s=2]Hi[/] there",
        10.0,
        "sans",
        Rect::new(0.0, 0.0, 30.0, 100.0),
    )
    .with_default_color("navy");
    let result = layout(&WideGapMeasurer, &req);

    assert_eq!(result.lines.len(), 2);
    let first = &result.lines[0].segments;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].text, "Hi");
    assert_eq!(first[0].fg.as_deref(), Some("red"));
    assert_eq!(first[0].pixel_size, 20);

    let second = &result.lines[1].segments;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].text, "there");
    assert_eq!(second[0].fg, None);
    assert_eq!(second[0].pixel_size, 10);
    assert_eq!(result.lines[1].y, 20.0);

    let mut surface = ColorCapture::default();
    render(&mut surface, &result, None).unwrap();
    assert_eq!(
        surface.painted,
        vec![
            ("Hi".to_string(), "red".to_string()),
            ("there".to_string(), "navy".to_string()),
        ]
    );
    assert_eq!(surface.depth, 0);

    assert_eq!(measure(&WideGapMeasurer, &req).height, 30.0);
}

#[test]
fn escaped_brackets_are_measured_as_literal_text() {
    let measurer = RecordingMeasurer::default();
    let req = TextRequest::new("[[x]]", 10.0, "sans", Rect::new(0.0, 0.0, 100.0, 20.0));
    let size = measure(&measurer, &req);
    let seen: String = measurer
        .seen
        .borrow()
        .iter()
        .map(|(text, _)| text.as_str())
        .collect();
    assert_eq!(seen, "[x]");
    assert_eq!(size.height, 10.0);

    let result = layout(&HeuristicMeasurer, &req);
    assert_eq!(result.lines[0].segments.len(), 1);
    assert_eq!(result.lines[0].segments[0].text, "[x]");
}

#[test]
fn empty_text_layout_has_one_base_height_line() {
    let req = TextRequest::new("", 16.0, "sans", Rect::new(0.0, 0.0, 200.0, 40.0))
        .with_align(HAlign::Left, VAlign::Top)
        .with_default_color("black");
    let result = layout(&HeuristicMeasurer, &req);
    assert_eq!(result.lines.len(), 1);
    assert!(result.lines[0].segments.is_empty());
    assert_eq!(result.lines[0].height, 16.0);
    assert_eq!(&*result.base_color, "black");
}

#[test]
fn nested_scopes_measure_at_composed_sizes() {
    let measurer = RecordingMeasurer::default();
    let req = TextRequest::new(
        "[s=2][s=3]A[/]B[/]C",
        10.0,
        "sans",
        Rect::new(0.0, 0.0, 500.0, 100.0),
    );
    let _ = measure(&measurer, &req);
    assert_eq!(
        *measurer.seen.borrow(),
        vec![
            ("A".to_string(), 60),
            ("B".to_string(), 20),
            ("C".to_string(), 10)
        ]
    );
}

#[test]
fn merged_lines_never_hold_adjacent_equal_styles() {
    let samples = [
        "plain words that wrap across several lines of text",
        "[fg=red]red [bg=blue]boxed[/] red again[/] plain [s=1.5]big words here[/]",
        "[a=0.5]faded [a=0.5]fainter[/] faded[/]\n\n[s=0.5]tiny[/] end",
        "[[escaped]] [/][/] [fg=#0f0 s=2 a=2]x y z[/] ]] tail",
    ];
    for markup in samples {
        let runs = parse_runs(markup);
        let atoms = atomize(&runs);
        for width in [15.0, 40.0, 90.0, 400.0] {
            let lines = LineWrapper::new(&HeuristicMeasurer, 12.0, "sans", width).wrap(&atoms);
            assert!(!lines.is_empty());
            for line in &lines {
                assert!(line.segments.len() <= line.atom_count, "{markup:?} @ {width}");
                for pair in line.segments.windows(2) {
                    assert!(!pair[0].same_style(&pair[1]), "{markup:?} @ {width}");
                }
                let sum: f32 = line.segments.iter().map(|s| s.width).sum();
                assert!((sum - line.width).abs() < 1e-3);
            }
        }
    }
}

#[test]
fn wrapped_lines_respect_width_unless_a_single_word_overflows() {
    let markup = "the quick brown fox jumps over the lazy dog again and again";
    let req = TextRequest::new(markup, 14.0, "serif", Rect::new(0.0, 0.0, 80.0, 400.0));
    let result = LayoutEngine::default().layout(&HeuristicMeasurer, &req);
    assert!(result.lines.len() > 3);
    for line in &result.lines {
        let words = line
            .segments
            .iter()
            .flat_map(|s| s.text.split_whitespace())
            .count();
        assert!(line.width <= 80.0 || words == 1, "line {:?}", line);
        assert!(!line.segments[0].text.starts_with(' '));
    }
}

#[test]
fn auto_size_then_layout_agree_on_height() {
    let markup = "[s=1.5]Title[/]\nbody text that goes on for a while [bg=yellow]highlight[/]";
    let rect = Rect::new(10.0, 20.0, 120.0, 0.0);
    let sized = measure(&HeuristicMeasurer, &TextRequest::new(markup, 12.0, "sans", rect));
    let fitted = Rect {
        height: sized.height,
        ..rect
    };
    let result = layout(
        &HeuristicMeasurer,
        &TextRequest::new(markup, 12.0, "sans", fitted).with_align(HAlign::Center, VAlign::Middle),
    );
    assert_eq!(result.size(), sized);
    assert!(result.vertical_offset.abs() < 1e-3);
}

#[test]
fn small_font_round_trip_reports_surface_pixels() {
    let req = TextRequest::new("tiny text\nline", 6.0, "sans", Rect::new(0.0, 0.0, 200.0, 50.0));
    let size = measure(&HeuristicMeasurer, &req);
    assert!((size.height - 12.0).abs() < 1e-3);
    let result = layout(&HeuristicMeasurer, &req);
    assert_eq!(result.lines.len(), 2);
    assert!((result.size().height - size.height).abs() < 1e-3);
}

#[test]
fn newline_after_a_space_does_not_break_the_line() {
    let req = TextRequest::new("ab \ncd", 10.0, "sans", Rect::new(0.0, 0.0, 500.0, 100.0));
    assert_eq!(measure(&HeuristicMeasurer, &req).height, 10.0);

    for wordwrap in [true, false] {
        let result = layout(&HeuristicMeasurer, &req.with_wordwrap(wordwrap));
        assert_eq!(result.lines.len(), 1, "wordwrap={wordwrap}");
        let text: String = result.lines[0]
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert!(text.ends_with("cd"), "wordwrap={wordwrap}: {text:?}");
    }

    let broken = TextRequest::new("ab\n cd", 10.0, "sans", Rect::new(0.0, 0.0, 500.0, 100.0));
    assert_eq!(measure(&HeuristicMeasurer, &broken).height, 20.0);
}
