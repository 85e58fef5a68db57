use crate::hittable::{HitRecord, Hittable};
use crate::math::{Aabb, Interval, Ray};
use std::cmp::Ordering;
use std::sync::Arc;

// ─── Bounding Volume Hierarchy ──────────────────────────────────────────────

/// Binary tree of axis-aligned boxes over the scene primitives. Construction
/// sorts by centroid along the longest axis of the enclosing box and splits at
/// the median; traversal slab-tests the node box and shortens the ray interval
/// by the nearer child's hit.
pub enum BvhNode {
    Leaf {
        object: Arc<dyn Hittable>,
        bbox: Aabb,
    },
    Interior {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Builds the hierarchy. An empty object list is a scene-construction
    /// failure reported as `None` rather than a panic.
    pub fn build(mut objects: Vec<Arc<dyn Hittable>>) -> Option<Self> {
        let len = objects.len();
        match len {
            0 => None,
            1 => {
                let object = objects.pop().unwrap();
                let bbox = object.bounding_box();
                Some(BvhNode::Leaf { object, bbox })
            }
            _ => {
                let enclosing = objects
                    .iter()
                    .map(|o| o.bounding_box())
                    .reduce(|a, b| Aabb::surrounding(&a, &b))
                    .unwrap();
                let axis = enclosing.longest_axis();

                objects.sort_by(|a, b| {
                    let ac = a.bounding_box().min[axis] + a.bounding_box().max[axis];
                    let bc = b.bounding_box().min[axis] + b.bounding_box().max[axis];
                    ac.partial_cmp(&bc).unwrap_or(Ordering::Equal)
                });

                let right_objects = objects.split_off(len / 2);
                let left = Box::new(BvhNode::build(objects)?);
                let right = Box::new(BvhNode::build(right_objects)?);
                let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
                Some(BvhNode::Interior { left, right, bbox })
            }
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, t_range) {
                    return None;
                }
                object.hit(ray, t_range)
            }
            BvhNode::Interior { left, right, bbox } => {
                if !bbox.hit(ray, t_range) {
                    return None;
                }
                let hit_left = left.hit(ray, t_range);
                let far = hit_left.as_ref().map_or(t_range.max, |h| h.t);
                let hit_right = right.hit(ray, Interval::new(t_range.min, far));
                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Interior { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{HittableList, Sphere};
    use crate::material::Lambertian;
    use crate::math::{Color, Point3, Vec3};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_spheres(count: usize, rng: &mut SmallRng) -> Vec<Arc<dyn Hittable>> {
        let material = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
        (0..count)
            .map(|_| {
                let center = Point3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                Arc::new(Sphere::new(center, rng.gen_range(0.1..1.0), material.clone()))
                    as Arc<dyn Hittable>
            })
            .collect()
    }

    fn assert_parent_contains_children(node: &BvhNode) {
        if let BvhNode::Interior { left, right, bbox } = node {
            assert!(bbox.contains_box(&left.bounding_box()));
            assert!(bbox.contains_box(&right.bounding_box()));
            assert_parent_contains_children(left);
            assert_parent_contains_children(right);
        }
    }

    #[test]
    fn empty_scene_is_not_constructible() {
        assert!(BvhNode::build(Vec::new()).is_none());
    }

    #[test]
    fn node_boxes_contain_their_children() {
        let mut rng = SmallRng::seed_from_u64(21);
        let bvh = BvhNode::build(random_spheres(64, &mut rng)).unwrap();
        assert_parent_contains_children(&bvh);
    }

    #[test]
    fn traversal_agrees_with_linear_scan() {
        let mut rng = SmallRng::seed_from_u64(22);
        let objects = random_spheres(32, &mut rng);

        let mut list = HittableList::new();
        for object in &objects {
            list.add(object.clone());
        }
        let bvh = BvhNode::build(objects).unwrap();

        let t_range = Interval::new(0.001, f64::INFINITY);
        for _ in 0..200 {
            let origin = Point3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
            );
            let direction = Vec3::random_unit_vector(&mut rng);
            let ray = Ray::new(origin, direction);

            let linear = list.hit(&ray, t_range).map(|h| h.t);
            let tree = bvh.hit(&ray, t_range).map(|h| h.t);
            match (linear, tree) {
                (None, None) => {}
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9),
                other => panic!("BVH/linear disagreement: {other:?}"),
            }
        }
    }
}
