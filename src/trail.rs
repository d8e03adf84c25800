// 〰️ Trail - Path geometry connecting the visited cells

use crate::grid::GridGeometry;
use crate::pattern::GestureSequence;

/// Straight segment in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Polyline through the visited cell centers, optionally ending at the pointer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    segments: Vec<Segment>,
}

impl Trail {
    /// Build the trail for `sequence`.
    ///
    /// With a live `pointer`, a last segment runs from the most recent center
    /// to the pointer once it is more than half a diameter away on either axis.
    pub fn build(
        geometry: &GridGeometry,
        sequence: &GestureSequence,
        pointer: Option<(f64, f64)>,
    ) -> Self {
        let centers: Vec<(f64, f64)> = sequence
            .cells()
            .iter()
            .map(|&cell| geometry.center(cell))
            .collect();

        let mut segments: Vec<Segment> = centers
            .windows(2)
            .map(|pair| Segment {
                from: pair[0],
                to: pair[1],
            })
            .collect();

        if let (Some(&last), Some(pointer)) = (centers.last(), pointer) {
            let reach = geometry.cell_diameter() / 2.0;
            if (pointer.0 - last.0).abs() > reach || (pointer.1 - last.1).abs() > reach {
                segments.push(Segment {
                    from: last,
                    to: pointer,
                });
            }
        }

        Trail { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
