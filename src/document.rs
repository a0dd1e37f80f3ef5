use std::fmt::{self, Write as _};

use crate::color::Color;
use crate::vectorizer::SvgPathElement;
use crate::{LogotraceError, LogotraceResult};

/// The traced outline of one palette color.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFragment {
    pub color: Color,
    pub paths: Vec<SvgPathElement>,
    /// Coordinate space the tracer reported for this layer.
    pub view_box: Option<(u32, u32)>,
}

impl PathFragment {
    /// Fill color as `#rrggbb`.
    pub fn fill(&self) -> String {
        self.color.to_hex()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.data.trim().is_empty())
    }
}

/// Where the traced raster sat on the input canvas, in input pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Top-left corner of the traced raster before any upscaling.
    pub origin: (u32, u32),
    /// Size of the traced raster before any upscaling.
    pub size: (u32, u32),
}

impl Placement {
    /// A raster that covers the whole canvas.
    pub fn full(size: (u32, u32)) -> Self {
        Self {
            origin: (0, 0),
            size,
        }
    }
}

/// The rectangle of trace space shown by a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.min_x, self.min_y, self.width, self.height)
    }
}

/// A finished vector document: display size, the visible trace space, and layers in
/// paint order.
///
/// The view box spans the whole input canvas in trace units, so traced paths land
/// at their original position and size.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    pub width: u32,
    pub height: u32,
    pub view_box: ViewBox,
    pub fragments: Vec<PathFragment>,
}

/// Trace units per input pixel along one axis.
fn axis_scale(traced: u32, placed: u32) -> f64 {
    if placed == 0 {
        1.0
    } else {
        traced as f64 / placed as f64
    }
}

impl VectorDocument {
    /// A document without any shapes, sized to `width × height`.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            view_box: ViewBox::sized(width, height),
            fragments: Vec::new(),
        }
    }

    /// Assemble traced layers into a document displayed at `display` size.
    ///
    /// The first layer that reports a trace space defines it; every other reported
    /// space must agree. `traced` is used when no layer reports one. `placement`
    /// maps that space back onto the input canvas.
    pub fn compose(
        display: (u32, u32),
        placement: Placement,
        traced: (u32, u32),
        fragments: Vec<PathFragment>,
    ) -> LogotraceResult<Self> {
        if fragments.is_empty() {
            return Ok(Self::empty(display.0, display.1));
        }

        let mut space: Option<(u32, u32)> = None;
        for found in fragments.iter().filter_map(|f| f.view_box) {
            match space {
                None => space = Some(found),
                Some(expected) if expected != found => {
                    return Err(LogotraceError::ViewBoxMismatch { expected, found });
                }
                Some(_) => {}
            }
        }
        let (tw, th) = space.unwrap_or(traced);

        let sx = axis_scale(tw, placement.size.0);
        let sy = axis_scale(th, placement.size.1);
        // 0.0 - x keeps an untrimmed origin at +0 rather than -0
        let view_box = ViewBox {
            min_x: 0.0 - placement.origin.0 as f64 * sx,
            min_y: 0.0 - placement.origin.1 as f64 * sy,
            width: display.0 as f64 * sx,
            height: display.1 as f64 * sy,
        };

        Ok(Self {
            width: display.0,
            height: display.1,
            view_box,
            fragments,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Render as standalone SVG markup.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VectorDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}""#,
                r#" viewBox="{}" preserveAspectRatio="none">"#
            ),
            self.width, self.height, self.view_box
        )?;
        for fragment in &self.fragments {
            let fill = fragment.fill();
            for path in &fragment.paths {
                let mut element = format!(
                    r#"<path d="{}" fill="{}" fill-rule="evenodd""#,
                    path.data.trim(),
                    fill
                );
                if path.offset != (0.0, 0.0) {
                    write!(
                        element,
                        r#" transform="translate({},{})""#,
                        path.offset.0, path.offset.1
                    )?;
                }
                writeln!(f, "{element}/>")?;
            }
        }
        writeln!(f, "</svg>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(color: Color, view_box: Option<(u32, u32)>) -> PathFragment {
        PathFragment {
            color,
            paths: vec![SvgPathElement {
                data: "M0 0 L4 0 L4 4 Z".to_string(),
                offset: (0.0, 0.0),
            }],
            view_box,
        }
    }

    mod compose {
        use super::*;

        #[test]
        fn no_fragments_gives_empty_document_at_display_size() {
            let doc = VectorDocument::compose(
                (50, 50),
                Placement::full((50, 50)),
                (100, 100),
                Vec::new(),
            )
            .unwrap();
            assert_eq!(doc, VectorDocument::empty(50, 50));
            assert_eq!(doc.view_box, ViewBox::sized(50, 50));
        }

        #[test]
        fn first_reported_view_box_wins() {
            let doc = VectorDocument::compose(
                (100, 80),
                Placement::full((100, 80)),
                (1, 1),
                vec![
                    fragment(Color::new(0, 0, 0), None),
                    fragment(Color::new(255, 0, 0), Some((200, 160))),
                ],
            )
            .unwrap();
            assert_eq!((doc.width, doc.height), (100, 80));
            assert_eq!(doc.view_box, ViewBox::sized(200, 160));
        }

        #[test]
        fn mismatched_view_boxes_are_rejected() {
            let err = VectorDocument::compose(
                (10, 10),
                Placement::full((10, 10)),
                (20, 20),
                vec![
                    fragment(Color::new(0, 0, 0), Some((20, 20))),
                    fragment(Color::new(9, 9, 9), Some((21, 20))),
                ],
            )
            .unwrap_err();
            assert!(matches!(
                err,
                LogotraceError::ViewBoxMismatch {
                    expected: (20, 20),
                    found: (21, 20)
                }
            ));
        }

        #[test]
        fn traced_size_used_when_nobody_reports() {
            let doc = VectorDocument::compose(
                (10, 10),
                Placement::full((10, 10)),
                (30, 30),
                vec![fragment(Color::new(1, 1, 1), None)],
            )
            .unwrap();
            assert_eq!(doc.view_box, ViewBox::sized(30, 30));
        }

        #[test]
        fn trimmed_trace_keeps_its_position_and_size() {
            // 60×20 crop taken at (30, 140) of a 300×200 canvas, traced at 2×
            let placement = Placement {
                origin: (30, 140),
                size: (60, 20),
            };
            let doc = VectorDocument::compose(
                (300, 200),
                placement,
                (120, 40),
                vec![fragment(Color::new(0, 0, 0), Some((120, 40)))],
            )
            .unwrap();
            assert_eq!(
                doc.view_box,
                ViewBox {
                    min_x: -60.0,
                    min_y: -280.0,
                    width: 600.0,
                    height: 400.0
                }
            );
            // trace space maps back to 60×20 display pixels
            assert_eq!(120.0 * doc.width as f64 / doc.view_box.width, 60.0);
            assert_eq!(40.0 * doc.height as f64 / doc.view_box.height, 20.0);
        }
    }

    mod to_svg {
        use super::*;

        #[test]
        fn renders_paths_in_paint_order_with_even_odd_fill() {
            let mut red = fragment(Color::new(255, 0, 0), Some((200, 200)));
            red.paths[0].offset = (12.0, 3.5);
            let doc = VectorDocument::compose(
                (100, 100),
                Placement::full((100, 100)),
                (200, 200),
                vec![fragment(Color::new(0, 0, 0), Some((200, 200))), red],
            )
            .unwrap();
            let svg = doc.to_svg();

            assert!(svg.starts_with(concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100""#,
                r#" viewBox="0 0 200 200" preserveAspectRatio="none">"#
            )));
            let black = svg.find(r##"fill="#000000""##).unwrap();
            let red = svg.find(r##"fill="#ff0000""##).unwrap();
            assert!(black < red);
            assert_eq!(svg.matches(r#"fill-rule="evenodd""#).count(), 2);
            assert!(svg.contains(r#"transform="translate(12,3.5)""#));
            assert!(svg.trim_end().ends_with("</svg>"));
        }

        #[test]
        fn negative_origin_is_written_into_the_view_box() {
            let doc = VectorDocument::compose(
                (100, 100),
                Placement {
                    origin: (28, 28),
                    size: (44, 44),
                },
                (88, 88),
                vec![fragment(Color::new(0, 0, 0), Some((88, 88)))],
            )
            .unwrap();
            assert!(doc.to_svg().contains(r#"viewBox="-56 -56 200 200""#));
        }

        #[test]
        fn empty_document_is_valid_svg() {
            let svg = VectorDocument::empty(50, 50).to_svg();
            assert!(svg.contains(r#"width="50" height="50" viewBox="0 0 50 50""#));
            assert!(!svg.contains("<path"));
        }
    }
}
