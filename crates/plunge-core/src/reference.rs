//! Reference-array segmentation of the marker array.
//!
//! The marker array is partitioned into contiguous index ranges, each
//! tagged with a [`Phase`] and a sub-type id. Segments are appended in a
//! fixed order (fluid first, boundary second) and may only grow at the
//! tail; every mutation checks contiguity so a mis-ordered construction
//! sequence is caught where it happens.

use std::ops::Range;

use crate::error::BuildError;

/// Physical group of a marker or segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fluid or granular marker moved by the particle solver.
    Fluid,
    /// BCE marker slaved to a static or dynamic solid.
    Boundary,
}

impl Phase {
    /// Integer tag used by the snapshot format.
    pub fn code(self) -> i32 {
        match self {
            Self::Fluid => -1,
            Self::Boundary => 0,
        }
    }

    /// Inverse of [`code`](Phase::code).
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Fluid),
            0 => Some(Self::Boundary),
            _ => None,
        }
    }
}

/// One contiguous `[start, end)` range of the marker array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// First marker index.
    pub start: usize,
    /// One past the last marker index.
    pub end: usize,
    /// Physical group.
    pub phase: Phase,
    /// Sub-type id (`-1` for fluid, `0` for the shared boundary segment).
    pub subtype: i32,
}

impl Segment {
    /// Number of markers covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the segment covers no markers.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index range covered.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Ordered list of [`Segment`]s partitioning the marker array.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceArray {
    segments: Vec<Segment>,
}

impl ReferenceArray {
    /// An empty segmentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segment has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segments in insertion order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at `index`.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// End of the last segment (0 when empty).
    pub fn covered(&self) -> usize {
        self.segments.last().map_or(0, |s| s.end)
    }

    /// Append a segment.
    ///
    /// The segment must start where the previous one ends (or at 0 for
    /// the first segment) and must not be inverted.
    pub fn push(&mut self, segment: Segment) -> Result<(), BuildError> {
        if segment.end < segment.start {
            return Err(BuildError::InvertedSegment {
                start: segment.start,
                end: segment.end,
            });
        }
        let expected_start = self.covered();
        if segment.start != expected_start {
            return Err(BuildError::NonContiguousSegment {
                expected_start,
                found_start: segment.start,
            });
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Grow the last segment by `count` markers and return the new range.
    pub fn extend_last(&mut self, count: usize) -> Result<Range<usize>, BuildError> {
        let last = self
            .segments
            .last_mut()
            .ok_or(BuildError::UnexpectedSegmentCount {
                expected: 1,
                found: 0,
            })?;
        let start = last.end;
        last.end += count;
        Ok(start..last.end)
    }

    /// Check that the segments tile `[0, marker_count)` exactly.
    pub fn validate(&self, marker_count: usize) -> Result<(), BuildError> {
        let mut cursor = 0;
        for s in &self.segments {
            if s.start != cursor {
                return Err(BuildError::NonContiguousSegment {
                    expected_start: cursor,
                    found_start: s.start,
                });
            }
            if s.end < s.start {
                return Err(BuildError::InvertedSegment {
                    start: s.start,
                    end: s.end,
                });
            }
            cursor = s.end;
        }
        if cursor != marker_count {
            return Err(BuildError::SegmentCoverage {
                covered: cursor,
                markers: marker_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fluid(end: usize) -> Segment {
        Segment {
            start: 0,
            end,
            phase: Phase::Fluid,
            subtype: -1,
        }
    }

    fn boundary(start: usize) -> Segment {
        Segment {
            start,
            end: start,
            phase: Phase::Boundary,
            subtype: 0,
        }
    }

    #[test]
    fn fluid_then_empty_boundary_is_contiguous() {
        let mut refs = ReferenceArray::new();
        refs.push(fluid(10)).unwrap();
        refs.push(boundary(10)).unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs.get(1).unwrap().is_empty());
        assert!(refs.validate(10).is_ok());
    }

    #[test]
    fn gap_between_segments_rejected() {
        let mut refs = ReferenceArray::new();
        refs.push(fluid(10)).unwrap();
        match refs.push(boundary(11)) {
            Err(BuildError::NonContiguousSegment {
                expected_start: 10,
                found_start: 11,
            }) => {}
            other => panic!("expected NonContiguousSegment, got {other:?}"),
        }
    }

    #[test]
    fn inverted_segment_rejected() {
        let mut refs = ReferenceArray::new();
        let inverted = Segment {
            start: 5,
            end: 2,
            phase: Phase::Fluid,
            subtype: -1,
        };
        assert!(matches!(
            refs.push(inverted),
            Err(BuildError::InvertedSegment { start: 5, end: 2 })
        ));
        assert!(refs.is_empty());
    }

    #[test]
    fn extend_last_grows_tail_only() {
        let mut refs = ReferenceArray::new();
        refs.push(fluid(4)).unwrap();
        refs.push(boundary(4)).unwrap();
        assert_eq!(refs.extend_last(3).unwrap(), 4..7);
        assert_eq!(refs.extend_last(2).unwrap(), 7..9);
        assert_eq!(refs.get(0).unwrap().range(), 0..4);
        assert_eq!(refs.get(1).unwrap().range(), 4..9);
        assert!(refs.validate(9).is_ok());
        assert!(matches!(
            refs.validate(10),
            Err(BuildError::SegmentCoverage {
                covered: 9,
                markers: 10
            })
        ));
    }

    #[test]
    fn extend_on_empty_array_fails() {
        let mut refs = ReferenceArray::new();
        assert!(refs.extend_last(1).is_err());
    }

    #[test]
    fn phase_codes_round_trip() {
        for phase in [Phase::Fluid, Phase::Boundary] {
            assert_eq!(Phase::from_code(phase.code()), Some(phase));
        }
        assert_eq!(Phase::from_code(1), None);
        assert_eq!(Phase::from_code(7), None);
    }
}
