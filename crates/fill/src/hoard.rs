//! Deduplicated vertex storage shared by the two triangulation passes.

use crate::coordinates::CoordinateConverter;
use crate::math::{Box2D, Point};
use crate::subpath::{SubContour, SubPath};
use crate::FillOptions;

use std::collections::{BTreeSet, HashMap};

const POINTS_PER_GUIDING_BOX: u32 = 16;
const MIN_POINTS_PER_GUIDING_BOX: u32 = 4;
const GUIDING_BOXES_PER_GUIDING_BOX: u32 = 8;

/// One stored vertex: its position and the set of winding numbers of the
/// triangles that reference it.
pub(crate) struct FillPoint {
    pub position: Point,
    pub windings: BTreeSet<i32>,
}

/// Contour ids and guiding box ids generated from a sub-path, ready to feed
/// to the triangulation passes.
pub(crate) struct IdContours {
    pub contours: Vec<Vec<u32>>,
    /// Corner ids of each guiding box, in min_x_min_y, max_x_min_y,
    /// min_x_max_y, max_x_max_y order.
    pub guiding_boxes: Vec<[u32; 4]>,
}

/// Interns points by quantized position so that both triangulation passes,
/// and the subdivision points they generate, share vertex ids.
pub(crate) struct PointHoard {
    converter: CoordinateConverter,
    map: HashMap<(i32, i32), u32>,
    points: Vec<FillPoint>,
}

impl PointHoard {
    pub fn new(min: Point, max: Point) -> Self {
        PointHoard {
            converter: CoordinateConverter::new(min, max),
            map: HashMap::new(),
            points: Vec::new(),
        }
    }

    /// Returns the id of `position`, interning it on first sight.
    ///
    /// Deduplication uses the truncating integer quantization of the
    /// converter, so points closer than the quantization step share an id.
    pub fn fetch(&mut self, position: Point) -> u32 {
        let key = self.converter.iapply(position);
        if let Some(id) = self.map.get(&key) {
            return *id;
        }

        let id = self.points.len() as u32;
        self.points.push(FillPoint {
            position,
            windings: BTreeSet::new(),
        });
        self.map.insert(key, id);
        id
    }

    pub fn position(&self, id: u32) -> Point {
        self.points[id as usize].position
    }

    pub fn add_winding(&mut self, id: u32, winding: i32) {
        self.points[id as usize].windings.insert(winding);
    }

    pub fn converter(&self) -> &CoordinateConverter {
        &self.converter
    }

    pub fn points(&self) -> &[FillPoint] {
        &self.points
    }

    /// Interns every point of `input` and returns the contours as id lists,
    /// along with guiding boxes when those are enabled.
    pub fn generate_path(&mut self, input: &SubPath, options: &FillOptions) -> IdContours {
        let mut output = IdContours {
            contours: Vec::with_capacity(input.contours().len()),
            guiding_boxes: Vec::new(),
        };
        for contour in input.contours() {
            let ids = self.generate_contour(contour, options, &mut output.guiding_boxes);
            output.contours.push(ids);
        }
        output
    }

    fn generate_contour(
        &mut self,
        contour: &SubContour,
        options: &FillOptions,
        guiding_boxes: &mut Vec<[u32; 4]>,
    ) -> Vec<u32> {
        let mut ids = Vec::with_capacity(contour.len());
        let mut boxes: Vec<Option<Box2D>> = vec![None];
        let mut cnt = 0u32;
        let mut total_cnt = 0u32;

        for (v, pt) in contour.iter().enumerate() {
            // A new tessellated edge restarts the boxes under construction,
            // keeping each guiding box local to one edge of the source
            // geometry.
            if options.guiding_boxes && v != 0 && pt.start_edge {
                pre_process_boxes(&mut boxes, cnt);
                if total_cnt >= MIN_POINTS_PER_GUIDING_BOX {
                    self.process_bounding_boxes(&boxes, guiding_boxes);
                }
                boxes.clear();
                boxes.push(None);
                cnt = 0;
                total_cnt = 0;
            }

            ids.push(self.fetch(pt.position));
            union_point(boxes.last_mut().unwrap(), pt.position);
            cnt += 1;
            total_cnt += 1;
            if cnt == POINTS_PER_GUIDING_BOX {
                cnt = 0;
                boxes.push(None);
            }
        }

        if options.guiding_boxes {
            pre_process_boxes(&mut boxes, cnt);
            if total_cnt >= MIN_POINTS_PER_GUIDING_BOX {
                self.process_bounding_boxes(&boxes, guiding_boxes);
            }
        }

        ids
    }

    /// Emits the corners of each box, then recurses on boxes-of-boxes so
    /// that large contours get guiding structure at every scale.
    fn process_bounding_boxes(
        &mut self,
        in_boxes: &[Option<Box2D>],
        guiding_boxes: &mut Vec<[u32; 4]>,
    ) {
        let mut boxes_of_boxes: Vec<Option<Box2D>> = vec![None];
        let mut cnt = 0u32;
        let mut total_cnt = 0u32;

        for b in in_boxes {
            let b = match b {
                Some(b) => *b,
                None => continue,
            };

            let mut corners = [0u32; 4];
            for (k, corner) in corners.iter_mut().enumerate() {
                let x = if k & 1 != 0 { b.max.x } else { b.min.x };
                let y = if k & 2 != 0 { b.max.y } else { b.min.y };
                *corner = self.fetch(Point::new(x, y));
            }
            guiding_boxes.push(corners);

            union_box(boxes_of_boxes.last_mut().unwrap(), &b);
            cnt += 1;
            total_cnt += 1;
            if cnt == GUIDING_BOXES_PER_GUIDING_BOX {
                cnt = 0;
                boxes_of_boxes.push(None);
            }
        }

        pre_process_boxes(&mut boxes_of_boxes, cnt);
        if total_cnt >= GUIDING_BOXES_PER_GUIDING_BOX {
            self.process_bounding_boxes(&boxes_of_boxes, guiding_boxes);
        }
    }
}

fn union_point(dst: &mut Option<Box2D>, p: Point) {
    match dst {
        Some(b) => {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        None => *dst = Some(Box2D::new(p, p)),
    }
}

fn union_box(dst: &mut Option<Box2D>, src: &Box2D) {
    union_point(dst, src.min);
    union_point(dst, src.max);
}

/// Merges a trailing box holding too few points into its predecessor, and
/// drops a lone near-empty box entirely.
fn pre_process_boxes(boxes: &mut Vec<Option<Box2D>>, cnt: u32) {
    if cnt <= 4 && boxes.len() > 1 {
        let last = boxes.pop().unwrap();
        if let Some(b) = last {
            union_box(boxes.last_mut().unwrap(), &b);
        }
    } else if boxes.len() == 1 && cnt <= 2 {
        boxes.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::path::Path;

    #[test]
    fn fetch_dedups() {
        let mut hoard = PointHoard::new(point(0.0, 0.0), point(1.0, 1.0));
        let a = hoard.fetch(point(0.25, 0.5));
        let b = hoard.fetch(point(0.75, 0.5));
        let c = hoard.fetch(point(0.25 + 1e-9, 0.5));
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(hoard.points().len(), 2);
        assert_eq!(hoard.position(a), point(0.25, 0.5));
    }

    #[test]
    fn windings_accumulate() {
        let mut hoard = PointHoard::new(point(0.0, 0.0), point(1.0, 1.0));
        let a = hoard.fetch(point(0.5, 0.5));
        hoard.add_winding(a, 1);
        hoard.add_winding(a, -2);
        hoard.add_winding(a, 1);
        let windings: Vec<i32> = hoard.points()[a as usize].windings.iter().cloned().collect();
        assert_eq!(windings, vec![-2, 1]);
    }

    fn zigzag(n: usize) -> SubPath {
        let mut builder = Path::builder();
        builder.begin(point(0.0, 0.0));
        for i in 1..n {
            let x = i as f32 / n as f32;
            builder.line_to(point(x, if i % 2 == 0 { 0.0 } else { 0.25 }));
        }
        builder.close();
        SubPath::from_path(&builder.build())
    }

    #[test]
    fn generate_without_guiding_boxes() {
        let sub = zigzag(40);
        let mut hoard = PointHoard::new(sub.bounds().min, sub.bounds().max);
        let out = hoard.generate_path(&sub, &FillOptions::default());
        assert_eq!(out.contours.len(), 1);
        assert_eq!(out.contours[0].len(), 40);
        assert!(out.guiding_boxes.is_empty());
    }

    #[test]
    fn generate_with_guiding_boxes() {
        let sub = zigzag(40);
        let mut hoard = PointHoard::new(sub.bounds().min, sub.bounds().max);
        let options = FillOptions::default().with_guiding_boxes(true);
        let out = hoard.generate_path(&sub, &options);
        assert_eq!(out.contours[0].len(), 40);
        assert!(!out.guiding_boxes.is_empty());

        // Corner order: min_x_min_y, max_x_min_y, min_x_max_y, max_x_max_y.
        for b in &out.guiding_boxes {
            let p = [
                hoard.position(b[0]),
                hoard.position(b[1]),
                hoard.position(b[2]),
                hoard.position(b[3]),
            ];
            assert!(p[0].x <= p[1].x && p[0].y == p[1].y);
            assert!(p[2].x <= p[3].x && p[2].y == p[3].y);
            assert!(p[0].y <= p[2].y);
        }
    }
}
