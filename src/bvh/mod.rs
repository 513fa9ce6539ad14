use itertools::partition;

use crate::bounds::{Axis, Bounds3f};
use crate::ray::Ray;
use crate::Vector3f;

stat_memory_counter!("Memory/BVH tree", tree_bytes);
stat_ratio!("BVH/Primitives per leaf node", total_primitives_per_leaf);
stat_counter!("BVH/Interior nodes", interior_nodes);
stat_counter!("BVH/Leaf nodes", leaf_nodes);

pub fn init_stats() {
    tree_bytes::init();
    total_primitives_per_leaf::init();
    interior_nodes::init();
    leaf_nodes::init();
}

#[derive(Copy, Clone, Debug)]
pub enum SplitMethod {
    Middle,
    SAH,
}

/// A bounding volume hierarchy over primitives of type `P`. `P` carries no
/// bounds or intersection logic of its own: the caller supplies both as
/// closures at build/query time, so the same tree code serves spheres,
/// triangles, or any future primitive without going through a vtable.
#[derive(Debug)]
pub struct Bvh<P: Copy> {
    primitives: Vec<P>,
    nodes: Vec<LinearBvhNode>,
}

impl<P: Copy> Bvh<P> {
    pub fn build<F>(prims: &[P], bounds_fn: F, max_prims_per_node: usize, split_method: SplitMethod) -> Bvh<P>
    where
        F: Fn(&P) -> Bounds3f + Copy,
    {
        if prims.is_empty() {
            return Bvh {
                primitives: Vec::new(),
                nodes: Vec::new(),
            };
        }

        let mut primitive_info: Vec<BvhPrimitiveInfo> = prims
            .iter()
            .enumerate()
            .map(|(i, p)| BvhPrimitiveInfo::new(i, bounds_fn(p)))
            .collect();

        let mut total_nodes = 0;
        let mut ordered_prims = Vec::with_capacity(prims.len());
        let root = recursive_build(
            prims,
            &mut primitive_info,
            0,
            prims.len(),
            max_prims_per_node,
            &mut total_nodes,
            &mut ordered_prims,
            split_method,
        );

        let mut nodes = Vec::with_capacity(total_nodes);
        flatten_bvh(&root, &mut nodes);
        assert_eq!(nodes.len(), total_nodes);

        tree_bytes::add((total_nodes * std::mem::size_of::<LinearBvhNode>()) as u64);

        Bvh {
            primitives: ordered_prims,
            nodes,
        }
    }

    pub fn world_bounds(&self) -> Bounds3f {
        if self.nodes.is_empty() {
            Bounds3f::new()
        } else {
            self.nodes[0].bounds
        }
    }

    /// Traverse front-to-back, calling `hit_fn(primitive, ray, t_min, closest_t)`
    /// for every primitive in a visited leaf; keeps whichever hit reports the
    /// smallest `t`.
    pub fn intersect<R, F>(&self, ray: &Ray, t_min: f32, t_max: f32, mut hit_fn: F) -> Option<R>
    where
        R: HasT,
        F: FnMut(P, &Ray, f32, f32) -> Option<R>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest = t_max;
        let mut result = None;

        let mut to_visit_offset = 0;
        let mut current_node_idx = 0;
        let mut nodes_to_visit = [0usize; 64];
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];

        loop {
            let node = &self.nodes[current_node_idx];
            if node.bounds.intersect_p_fast(ray, &inv_dir, &dir_is_neg) {
                match node.data {
                    LinearBvhNodeData::Leaf {
                        primitives_offset,
                        num_prims,
                    } => {
                        for i in 0..num_prims {
                            if let Some(hit) =
                                hit_fn(self.primitives[primitives_offset + i], ray, t_min, closest)
                            {
                                closest = hit.t();
                                result = Some(hit);
                            }
                        }
                        if to_visit_offset == 0 {
                            break;
                        }
                        to_visit_offset -= 1;
                        current_node_idx = nodes_to_visit[to_visit_offset];
                    }
                    LinearBvhNodeData::Interior {
                        axis,
                        second_child_offset,
                    } => {
                        let axis_num = axis as usize;
                        if dir_is_neg[axis_num] != 0 {
                            nodes_to_visit[to_visit_offset] = current_node_idx + 1;
                            to_visit_offset += 1;
                            current_node_idx = second_child_offset;
                        } else {
                            nodes_to_visit[to_visit_offset] = second_child_offset;
                            to_visit_offset += 1;
                            current_node_idx += 1;
                        }
                    }
                }
            } else {
                if to_visit_offset == 0 {
                    break;
                }
                to_visit_offset -= 1;
                current_node_idx = nodes_to_visit[to_visit_offset];
            }
        }

        result
    }

    /// Shadow-ray form: stops at the first primitive `hit_fn` accepts.
    pub fn intersect_p<F>(&self, ray: &Ray, t_min: f32, t_max: f32, mut hit_fn: F) -> bool
    where
        F: FnMut(P, &Ray, f32, f32) -> bool,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let mut to_visit_offset = 0;
        let mut current_node_idx = 0;
        let mut nodes_to_visit = [0usize; 64];
        let inv_dir = Vector3f::new(1.0 / ray.d.x, 1.0 / ray.d.y, 1.0 / ray.d.z);
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];

        loop {
            let node = &self.nodes[current_node_idx];
            if node.bounds.intersect_p_fast(ray, &inv_dir, &dir_is_neg) {
                match node.data {
                    LinearBvhNodeData::Leaf {
                        primitives_offset,
                        num_prims,
                    } => {
                        for i in 0..num_prims {
                            if hit_fn(self.primitives[primitives_offset + i], ray, t_min, t_max) {
                                return true;
                            }
                        }
                        if to_visit_offset == 0 {
                            break;
                        }
                        to_visit_offset -= 1;
                        current_node_idx = nodes_to_visit[to_visit_offset];
                    }
                    LinearBvhNodeData::Interior {
                        axis,
                        second_child_offset,
                    } => {
                        let axis_num = axis as usize;
                        if dir_is_neg[axis_num] != 0 {
                            nodes_to_visit[to_visit_offset] = current_node_idx + 1;
                            to_visit_offset += 1;
                            current_node_idx = second_child_offset;
                        } else {
                            nodes_to_visit[to_visit_offset] = second_child_offset;
                            to_visit_offset += 1;
                            current_node_idx += 1;
                        }
                    }
                }
            } else {
                if to_visit_offset == 0 {
                    break;
                }
                to_visit_offset -= 1;
                current_node_idx = nodes_to_visit[to_visit_offset];
            }
        }

        false
    }
}

/// Lets `Bvh::intersect` read the hit distance off of whatever result type
/// the caller's `hit_fn` returns, without the BVH needing to know its shape.
pub trait HasT {
    fn t(&self) -> f32;
}

fn recursive_build<P: Copy>(
    primitives: &[P],
    primitive_info: &mut [BvhPrimitiveInfo],
    start: usize,
    end: usize,
    max_prims_per_node: usize,
    total_nodes: &mut usize,
    ordered_prims: &mut Vec<P>,
    split_method: SplitMethod,
) -> BvhBuildNode {
    *total_nodes += 1;
    let n_primitives = end - start;
    assert_ne!(start, end);

    let bounds = primitive_info[start..end]
        .iter()
        .fold(Bounds3f::new(), |b, pi| Bounds3f::union(&b, &pi.bounds));

    let make_leaf = |primitive_info: &[BvhPrimitiveInfo], ordered_prims: &mut Vec<P>| {
        let first_prim_offset = ordered_prims.len();
        for pi in primitive_info[start..end].iter() {
            ordered_prims.push(primitives[pi.prim_number]);
        }
        BvhBuildNode::leaf(first_prim_offset, n_primitives, bounds)
    };

    if n_primitives == 1 {
        return make_leaf(primitive_info, ordered_prims);
    }

    let centroid_bounds = primitive_info[start..end]
        .iter()
        .fold(Bounds3f::new(), |bb, pi| Bounds3f::union_point(&bb, &pi.centroid));
    let dimension = centroid_bounds.maximum_extent();

    if centroid_bounds.p_min[dimension] == centroid_bounds.p_max[dimension] {
        return make_leaf(primitive_info, ordered_prims);
    }

    let mut mid;
    match split_method {
        SplitMethod::Middle => {
            let pmid = 0.5 * (centroid_bounds.p_min[dimension] + centroid_bounds.p_max[dimension]);
            mid = start
                + partition(primitive_info[start..end].iter_mut(), |pi| {
                    pi.centroid[dimension] < pmid
                });
            if mid == start || mid == end {
                primitive_info[start..end]
                    .sort_by(|p1, p2| p1.centroid[dimension].partial_cmp(&p2.centroid[dimension]).unwrap());
                mid = (start + end) / 2;
            }
        }
        SplitMethod::SAH => {
            if n_primitives <= 2 {
                mid = (start + end) / 2;
                if start != end - 1
                    && primitive_info[end - 1].centroid[dimension] < primitive_info[start].centroid[dimension]
                {
                    primitive_info.swap(start, end - 1);
                }
            } else {
                const N_BUCKETS: usize = 12;
                let mut buckets = [BucketInfo::default(); N_BUCKETS];

                for pi in primitive_info[start..end].iter() {
                    let mut b = (N_BUCKETS as f32 * centroid_bounds.offset(&pi.centroid)[dimension]) as usize;
                    if b == N_BUCKETS {
                        b = N_BUCKETS - 1;
                    }
                    buckets[b].count += 1;
                    buckets[b].bounds = Bounds3f::union(&buckets[b].bounds, &pi.bounds);
                }

                let mut cost = [0.0; N_BUCKETS - 1];
                for (i, cost_i) in cost.iter_mut().enumerate() {
                    let mut b0 = Bounds3f::new();
                    let mut b1 = Bounds3f::new();
                    let mut count0 = 0;
                    let mut count1 = 0;
                    for bucket in buckets.iter().take(i + 1) {
                        b0 = Bounds3f::union(&b0, &bucket.bounds);
                        count0 += bucket.count;
                    }
                    for bucket in buckets.iter().skip(i + 1) {
                        b1 = Bounds3f::union(&b1, &bucket.bounds);
                        count1 += bucket.count;
                    }
                    *cost_i =
                        0.5 + (count0 as f32 * b0.surface_area() + count1 as f32 * b1.surface_area())
                            / bounds.surface_area();
                }

                let mut min_cost = cost[0];
                let mut min_cost_split_bucket = 0;
                for (i, &c) in cost.iter().enumerate().skip(1) {
                    if c < min_cost {
                        min_cost = c;
                        min_cost_split_bucket = i;
                    }
                }

                let leaf_cost = n_primitives as f32;
                if n_primitives > max_prims_per_node || min_cost < leaf_cost {
                    mid = start
                        + partition(primitive_info[start..end].iter_mut(), |pi| {
                            let mut b =
                                (N_BUCKETS as f32 * centroid_bounds.offset(&pi.centroid)[dimension]) as usize;
                            if b == N_BUCKETS {
                                b = N_BUCKETS - 1;
                            }
                            b <= min_cost_split_bucket
                        });
                } else {
                    return make_leaf(primitive_info, ordered_prims);
                }
            }
        }
    }

    let left = Box::new(recursive_build::<P>(
        primitives,
        primitive_info,
        start,
        mid,
        max_prims_per_node,
        total_nodes,
        ordered_prims,
        split_method,
    ));
    let right = Box::new(recursive_build::<P>(
        primitives,
        primitive_info,
        mid,
        end,
        max_prims_per_node,
        total_nodes,
        ordered_prims,
        split_method,
    ));
    BvhBuildNode::interior(dimension, left, right)
}

fn flatten_bvh(node: &BvhBuildNode, nodes: &mut Vec<LinearBvhNode>) -> usize {
    let offset = nodes.len();

    match *node {
        BvhBuildNode::Leaf {
            bounds,
            first_prim_offset,
            num_prims,
        } => {
            nodes.push(LinearBvhNode {
                bounds,
                data: LinearBvhNodeData::Leaf {
                    num_prims,
                    primitives_offset: first_prim_offset,
                },
            });
        }
        BvhBuildNode::Interior {
            bounds,
            split_axis,
            ref children,
        } => {
            nodes.push(LinearBvhNode {
                bounds,
                data: LinearBvhNodeData::Interior {
                    axis: split_axis,
                    second_child_offset: 0,
                },
            });
            flatten_bvh(&children[0], nodes);
            let second_offset = flatten_bvh(&children[1], nodes);
            nodes[offset].data = LinearBvhNodeData::Interior {
                axis: split_axis,
                second_child_offset: second_offset,
            };
        }
    }

    offset
}

struct BvhPrimitiveInfo {
    prim_number: usize,
    centroid: crate::Point3f,
    bounds: Bounds3f,
}

impl BvhPrimitiveInfo {
    fn new(prim_number: usize, bounds: Bounds3f) -> BvhPrimitiveInfo {
        BvhPrimitiveInfo {
            prim_number,
            centroid: 0.5 * bounds.p_min + 0.5 * bounds.p_max,
            bounds,
        }
    }
}

enum BvhBuildNode {
    Interior {
        bounds: Bounds3f,
        children: [Box<BvhBuildNode>; 2],
        split_axis: Axis,
    },
    Leaf {
        bounds: Bounds3f,
        first_prim_offset: usize,
        num_prims: usize,
    },
}

impl BvhBuildNode {
    fn interior(axis: Axis, left: Box<BvhBuildNode>, right: Box<BvhBuildNode>) -> BvhBuildNode {
        let bounds = Bounds3f::union(left.bounds(), right.bounds());
        interior_nodes::inc();
        BvhBuildNode::Interior {
            bounds,
            children: [left, right],
            split_axis: axis,
        }
    }

    fn leaf(first_prim_offset: usize, num_prims: usize, bounds: Bounds3f) -> BvhBuildNode {
        leaf_nodes::inc();
        total_primitives_per_leaf::add(num_prims as u64);
        total_primitives_per_leaf::inc_total();
        BvhBuildNode::Leaf {
            bounds,
            first_prim_offset,
            num_prims,
        }
    }

    fn bounds(&self) -> &Bounds3f {
        match self {
            BvhBuildNode::Interior { bounds, .. } | BvhBuildNode::Leaf { bounds, .. } => bounds,
        }
    }
}

#[derive(Debug)]
enum LinearBvhNodeData {
    Interior { second_child_offset: usize, axis: Axis },
    Leaf { primitives_offset: usize, num_prims: usize },
}

#[derive(Debug)]
struct LinearBvhNode {
    bounds: Bounds3f,
    data: LinearBvhNodeData,
}

#[derive(Debug, Default, Copy, Clone)]
struct BucketInfo {
    count: usize,
    bounds: Bounds3f,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point3f;

    #[derive(Copy, Clone, Debug)]
    struct TestSphere {
        id: usize,
        center: Point3f,
        radius: f32,
    }

    impl TestSphere {
        fn bounds(&self) -> Bounds3f {
            let r = Vector3f::new(self.radius, self.radius, self.radius);
            Bounds3f::from_points(&(self.center - r), &(self.center + r))
        }

        /// Quadratic ray/sphere intersection; returns the nearest `t` in
        /// `[t_min, t_max]`, if any.
        fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<f32> {
            let oc = ray.o - self.center;
            let a = ray.d.dot(&ray.d);
            let b = 2.0 * oc.dot(&ray.d);
            let c = oc.dot(&oc) - self.radius * self.radius;
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                return None;
            }
            let sqrt_disc = disc.sqrt();
            for &t in &[(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
                if t >= t_min && t <= t_max {
                    return Some(t);
                }
            }
            None
        }
    }

    struct Hit {
        t: f32,
        id: usize,
    }

    impl HasT for Hit {
        fn t(&self) -> f32 {
            self.t
        }
    }

    fn grid_of_spheres(n: usize) -> Vec<TestSphere> {
        (0..n)
            .map(|i| TestSphere {
                id: i,
                center: Point3f::new(i as f32 * 3.0, (i % 3) as f32 * 2.0, (i / 3) as f32),
                radius: 0.2,
            })
            .collect()
    }

    fn intersect_closest(bvh: &Bvh<TestSphere>, ray: &Ray) -> Option<usize> {
        bvh.intersect(ray, 1e-4, f32::INFINITY, |prim, ray, t_min, t_max| {
            prim.intersect(ray, t_min, t_max).map(|t| Hit { t, id: prim.id })
        })
        .map(|hit| hit.id)
    }

    fn intersect_any(bvh: &Bvh<TestSphere>, ray: &Ray) -> bool {
        bvh.intersect_p(ray, 1e-4, f32::INFINITY, |prim, ray, t_min, t_max| {
            prim.intersect(ray, t_min, t_max).is_some()
        })
    }

    #[test]
    fn empty_primitive_list_yields_empty_tree() {
        let bvh: Bvh<TestSphere> = Bvh::build(&[], TestSphere::bounds, 4, SplitMethod::SAH);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(intersect_closest(&bvh, &ray), None);
        assert!(!intersect_any(&bvh, &ray));
    }

    #[test]
    fn root_bounds_contain_every_primitive_bounds() {
        let spheres = grid_of_spheres(20);
        let bvh = Bvh::build(&spheres, TestSphere::bounds, 2, SplitMethod::SAH);
        let world = bvh.world_bounds();
        for s in &spheres {
            let b = s.bounds();
            assert!(world.p_min.x <= b.p_min.x && world.p_min.y <= b.p_min.y && world.p_min.z <= b.p_min.z);
            assert!(world.p_max.x >= b.p_max.x && world.p_max.y >= b.p_max.y && world.p_max.z >= b.p_max.z);
        }
    }

    #[test]
    fn closest_hit_picks_nearest_primitive_along_ray() {
        let spheres = vec![
            TestSphere { id: 0, center: Point3f::new(0.0, 0.0, 5.0), radius: 0.5 },
            TestSphere { id: 1, center: Point3f::new(0.0, 0.0, 2.0), radius: 0.5 },
            TestSphere { id: 2, center: Point3f::new(0.0, 0.0, 8.0), radius: 0.5 },
        ];
        let bvh = Bvh::build(&spheres, TestSphere::bounds, 1, SplitMethod::SAH);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(intersect_closest(&bvh, &ray), Some(1));
    }

    #[test]
    fn intersect_and_intersect_p_agree_on_occlusion() {
        let spheres = grid_of_spheres(30);
        let bvh = Bvh::build(&spheres, TestSphere::bounds, 3, SplitMethod::SAH);

        let rays = [
            Ray::new(Point3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
            Ray::new(Point3f::new(3.0, 2.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
            Ray::new(Point3f::new(100.0, 100.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
            Ray::new(Point3f::new(6.0, 1.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
        ];
        for ray in &rays {
            assert_eq!(intersect_closest(&bvh, ray).is_some(), intersect_any(&bvh, ray));
        }
    }

    #[test]
    fn tree_shape_does_not_change_which_primitive_is_hit() {
        let spheres = grid_of_spheres(25);
        let rays = [
            Ray::new(Point3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
            Ray::new(Point3f::new(9.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
            Ray::new(Point3f::new(21.0, 2.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
        ];

        let reference = Bvh::build(&spheres, TestSphere::bounds, 1, SplitMethod::SAH);
        for &max_prims in &[2usize, 4, 8, 64] {
            let candidate = Bvh::build(&spheres, TestSphere::bounds, max_prims, SplitMethod::SAH);
            for ray in &rays {
                assert_eq!(
                    intersect_closest(&reference, ray),
                    intersect_closest(&candidate, ray),
                    "mismatch at max_prims_per_node={}",
                    max_prims
                );
            }
        }
    }

    #[test]
    fn middle_split_method_agrees_with_sah_on_hit_results() {
        let spheres = grid_of_spheres(25);
        let sah = Bvh::build(&spheres, TestSphere::bounds, 4, SplitMethod::SAH);
        let middle = Bvh::build(&spheres, TestSphere::bounds, 4, SplitMethod::Middle);

        let rays = [
            Ray::new(Point3f::new(0.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
            Ray::new(Point3f::new(15.0, 0.0, -10.0), Vector3f::new(0.0, 0.0, 1.0)),
        ];
        for ray in &rays {
            assert_eq!(intersect_closest(&sah, ray), intersect_closest(&middle, ray));
        }
    }

    #[test]
    fn ray_missing_every_primitive_returns_none() {
        let spheres = grid_of_spheres(10);
        let bvh = Bvh::build(&spheres, TestSphere::bounds, 4, SplitMethod::SAH);
        let ray = Ray::new(Point3f::new(0.0, 500.0, -10.0), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(intersect_closest(&bvh, &ray), None);
        assert!(!intersect_any(&bvh, &ray));
    }
}
