//! DHAT heap profiler for richmark.
//!
//! Profiles allocation patterns across the markup pipeline:
//! tokenize -> style -> wrap -> layout -> render.
//!
//! Usage:
//!   cargo run -p richmark-heap-profile --release -- [OPTIONS] [MARKUP_FILES...]
//!
//! Outputs dhat-<phase>.json files in the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::{Path, PathBuf};
use std::process::Command;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use richmark::{atomize, parse_runs, tokenize};
use richmark_embedded_graphics::{EgSurface, EgTextMeasurer};
use richmark_render::{render, LayoutEngine, LineWrapper, Rect, TextRequest};

const DISPLAY_WIDTH: u32 = 480;
const DISPLAY_HEIGHT: u32 = 800;
const FONT_SIZE_PX: f32 = 16.0;
const GENERATED: &str = "generated";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tokenize,
    Style,
    Wrap,
    Layout,
    Render,
    Full,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "tokenize" => Some(Self::Tokenize),
            "style" => Some(Self::Style),
            "wrap" => Some(Self::Wrap),
            "layout" => Some(Self::Layout),
            "render" => Some(Self::Render),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize",
            Self::Style => "style",
            Self::Wrap => "wrap",
            Self::Layout => "layout",
            Self::Render => "render",
            Self::Full => "full",
        }
    }
}

/// Draw target that discards pixels.
struct NullDisplay;

impl OriginDimensions for NullDisplay {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl DrawTarget for NullDisplay {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for _ in pixels {}
        Ok(())
    }
}

/// Styled prose that exercises nesting, escapes, and explicit breaks.
fn generated_markup(paragraphs: usize) -> String {
    let mut out = String::with_capacity(paragraphs * 256);
    for idx in 0..paragraphs {
        out.push_str("[s=1.5 fg=#223344]Section ");
        out.push_str(&idx.to_string());
        out.push_str("[/]\n");
        out.push_str("Plain words fill the line until the wrapper has to break. ");
        out.push_str("[fg=red]Red [bg=yellow]highlighted[/] text[/] and ");
        out.push_str("[a=0.5]faded [s=0.8]small print[/][/] with [[escaped]] brackets. ");
        out.push_str("[fg=navy s=1.2 a=0.9]Nested [fg=green]scopes[/] close[/] cleanly.\n\n");
    }
    out
}

fn load_markup(path: &Path) -> String {
    if path.as_os_str() == GENERATED {
        return generated_markup(200);
    }
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

fn request(markup: &str) -> TextRequest<'_> {
    TextRequest::new(
        markup,
        FONT_SIZE_PX,
        "mono",
        Rect::new(0.0, 0.0, DISPLAY_WIDTH as f32, DISPLAY_HEIGHT as f32),
    )
}

fn profile_file(path: &Path, phase: Phase) {
    let markup = load_markup(path);
    let engine = LayoutEngine::new(EgTextMeasurer::layout_config());

    match phase {
        Phase::Tokenize => {
            let _tokens = tokenize(&markup);
        }
        Phase::Style => {
            let _runs = parse_runs(&markup);
        }
        Phase::Wrap => {
            let runs = parse_runs(&markup);
            let atoms = atomize(&runs);
            let _lines = LineWrapper::new(
                &EgTextMeasurer,
                FONT_SIZE_PX,
                "mono",
                DISPLAY_WIDTH as f32,
            )
            .wrap(&atoms);
        }
        Phase::Layout => {
            let _layout = engine.layout(&EgTextMeasurer, &request(&markup));
        }
        Phase::Render => {
            let layout = engine.layout(&EgTextMeasurer, &request(&markup));
            let mut display = NullDisplay;
            let mut surface = EgSurface::new(&mut display);
            for _ in 0..5 {
                let _ = render(&mut surface, &layout, None);
            }
        }
        Phase::Full => {
            // Measure, then lay out into the fitted height, then paint.
            let req = request(&markup);
            let size = engine.measure(&EgTextMeasurer, &req);
            let fitted = TextRequest {
                rect: Rect {
                    height: size.height,
                    ..req.rect
                },
                ..req
            };
            let layout = engine.layout(&EgTextMeasurer, &fitted);
            let mut display = NullDisplay;
            let mut surface = EgSurface::new(&mut display);
            let _ = render(&mut surface, &layout, Some("black"));
        }
    }
}

/// Extract a short name from a file path for use in output filenames.
fn short_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [MARKUP_FILES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  --phase <tokenize|style|wrap|layout|render|full>  Pipeline phase to profile (default: layout)"
    );
    eprintln!("  --out-dir <DIR>                      Output directory for dhat JSON (default: target/memory)");
    eprintln!(
        "  --aggregate                          Single profile for all inputs (default: per-input)"
    );
    eprintln!();
    eprintln!("By default, each input gets its own clean DHAT profile (separate process).");
    eprintln!("If no files are given, profiles a generated markup corpus.");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Layout;
    let mut out_dir = PathBuf::from("target/memory");
    let mut files: Vec<PathBuf> = Vec::with_capacity(8);
    let mut aggregate = false;
    // Internal flag: when set, we're a child process profiling a single input.
    let mut single_file_mode = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" => {
                i += 1;
                let value = args.get(i).map(String::as_str).unwrap_or("");
                phase = Phase::from_str(value).unwrap_or_else(|| {
                    eprintln!("Unknown phase: {}", value);
                    usage();
                    std::process::exit(1);
                });
            }
            "--out-dir" => {
                i += 1;
                out_dir = PathBuf::from(args.get(i).map(String::as_str).unwrap_or("."));
            }
            "--aggregate" => {
                aggregate = true;
            }
            "--single-file" => {
                single_file_mode = true;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => {
                files.push(PathBuf::from(other));
            }
        }
        i += 1;
    }

    if files.is_empty() {
        files.push(PathBuf::from(GENERATED));
    }

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    let phase_name = phase.name();

    if single_file_mode {
        assert!(files.len() == 1, "--single-file expects exactly one input");
        let file = &files[0];
        let name = short_name(file);
        let json_path = out_dir.join(format!("dhat-{phase_name}-{name}.json"));

        let _profiler = dhat::Profiler::builder().file_name(json_path).build();

        profile_file(file, phase);
        return;
    }

    if aggregate {
        let json_path = out_dir.join(format!("dhat-{phase_name}.json"));
        eprintln!(
            "heap-profile: phase={}, inputs={} (aggregate), out={}",
            phase_name,
            files.len(),
            out_dir.display()
        );

        let _profiler = dhat::Profiler::builder()
            .file_name(json_path.clone())
            .build();

        for file in &files {
            eprintln!("  profiling: {}", file.display());
            profile_file(file, phase);
        }

        eprintln!(
            "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
            json_path.display()
        );
        return;
    }

    let self_exe = std::env::current_exe().unwrap_or_else(|e| {
        eprintln!("Failed to determine own executable path: {}", e);
        std::process::exit(1);
    });

    eprintln!(
        "heap-profile: phase={}, inputs={} (per-input), out={}",
        phase_name,
        files.len(),
        out_dir.display()
    );

    let mut any_failed = false;
    for file in &files {
        let name = short_name(file);
        eprintln!(
            "  profiling: {} -> dhat-{}-{}.json",
            file.display(),
            phase_name,
            name
        );

        let status = Command::new(&self_exe)
            .arg("--single-file")
            .arg("--phase")
            .arg(phase_name)
            .arg("--out-dir")
            .arg(&out_dir)
            .arg(file)
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                eprintln!("    FAILED (exit {})", s.code().unwrap_or(-1));
                any_failed = true;
            }
            Err(e) => {
                eprintln!("    FAILED to spawn: {}", e);
                any_failed = true;
            }
        }
    }

    eprintln!();
    eprintln!("Open profiles in https://nnethercote.github.io/dh_view/dh_view.html");

    if any_failed {
        std::process::exit(1);
    }
}
