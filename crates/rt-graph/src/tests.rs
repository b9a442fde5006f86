//! Unit tests for rt-graph.
//!
//! All tests use hand-built graphs; CSV tests write to temporary files.

#[cfg(test)]
mod helpers {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use rt_core::{EdgeId, Point, VertexId};

    use crate::{EdgeData, RoadGraph};

    pub const A: VertexId = VertexId(1);
    pub const B: VertexId = VertexId(2);
    pub const C: VertexId = VertexId(3);

    pub fn edge(id: u32, from: VertexId, to: VertexId, length: f64) -> EdgeData {
        EdgeData { id: EdgeId(id), from, to, length, max_speed: 0.0 }
    }

    /// A→B (5), B→C (5), A→C (20).
    pub fn triangle() -> RoadGraph {
        let mut g = RoadGraph::new();
        g.add_vertex(A, Some(Point::new(0.0, 0.0)));
        g.add_vertex(B, Some(Point::new(5.0, 1.0)));
        g.add_vertex(C, Some(Point::new(10.0, 0.0)));
        g.add_edge(edge(10, A, B, 5.0)).unwrap();
        g.add_edge(edge(11, B, C, 5.0)).unwrap();
        g.add_edge(edge(12, A, C, 20.0)).unwrap();
        g
    }

    pub fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }
}

// ── Graph structure ───────────────────────────────────────────────────────────

#[cfg(test)]
mod network {
    use rt_core::{EdgeId, Point, VertexId};

    use super::helpers::{A, B, C, edge, rng, triangle};
    use crate::network::MAX_EDGE_ID;
    use crate::{GraphError, RoadGraph};

    #[test]
    fn empty_graph() {
        let g = RoadGraph::new();
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert!(g.bounding_box().is_none());
        assert!(g.nearest_vertex(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn duplicate_vertex_is_noop() {
        let mut g = RoadGraph::new();
        assert!(g.add_vertex(A, Some(Point::new(1.0, 1.0))));
        assert!(!g.add_vertex(A, Some(Point::new(9.0, 9.0))));
        assert_eq!(g.vertex_count(), 1);
        assert_eq!(g.vertex(A).unwrap().pos, Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn duplicate_edge_is_noop() {
        let mut g = triangle();
        // Same id.
        assert!(!g.add_edge(edge(10, B, A, 3.0)).unwrap());
        // Same (from, to).
        assert!(!g.add_edge(edge(99, A, B, 3.0)).unwrap());
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_between(A, B).unwrap().length(), 5.0);
    }

    #[test]
    fn edge_requires_both_endpoints() {
        let mut g = triangle();
        let err = g.add_edge(edge(50, A, VertexId(77), 1.0)).unwrap_err();
        assert!(matches!(err, GraphError::VertexNotFound(VertexId(77))));
    }

    #[test]
    fn edge_rejects_bad_length_and_speed() {
        let mut g = triangle();
        assert!(matches!(
            g.add_edge(edge(50, B, A, 0.0)),
            Err(GraphError::InvalidEdge(_))
        ));
        let mut e = edge(51, B, A, 1.0);
        e.max_speed = -1.0;
        assert!(matches!(g.add_edge(e), Err(GraphError::InvalidEdge(_))));
    }

    #[test]
    fn lookups() {
        let g = triangle();
        assert_eq!(g.edge(EdgeId(11)).unwrap().from(), B);
        assert!(matches!(g.edge(EdgeId(5)), Err(GraphError::EdgeNotFound(EdgeId(5)))));
        assert!(matches!(
            g.edge_between(C, A),
            Err(GraphError::EdgeBetweenNotFound { from: C, to: A })
        ));
        assert_eq!(g.out_edges(A).unwrap().count(), 2);
        assert_eq!(g.vertex(C).unwrap().in_degree(), 2);
        assert_eq!(g.vertex(C).unwrap().out_degree(), 0);
    }

    #[test]
    fn connect_mints_unique_ids() {
        let mut g = RoadGraph::new();
        for i in 0..20 {
            g.add_vertex(VertexId(i), None);
        }
        let mut rng = rng();
        let mut ids = Vec::new();
        for i in 0..19 {
            let id = g
                .connect(VertexId(i), VertexId(i + 1), 1.0, 0.0, &mut rng)
                .unwrap()
                .expect("fresh pair");
            assert!(id.raw() < MAX_EDGE_ID);
            ids.push(id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 19);

        // Existing pair is skipped.
        let again = g.connect(VertexId(0), VertexId(1), 1.0, 0.0, &mut rng).unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn vertices_from_edges_skips_isolated() {
        let mut g = triangle();
        g.add_vertex(VertexId(40), None);
        assert_eq!(g.vertices_from_edges(), vec![A, B, C]);
    }

    #[test]
    fn bounding_box_and_rect_query() {
        let mut g = triangle();
        g.add_vertex(VertexId(40), None);
        let bbox = g.bounding_box().unwrap();
        assert_eq!(bbox.bottom_left, Point::new(0.0, 0.0));
        assert_eq!(bbox.top_right, Point::new(10.0, 1.0));

        let left = rt_core::BoundingBox::new(Point::new(0.0, 0.0), Point::new(5.0, 1.0));
        let mut inside: Vec<_> = g.vertices_within(&left).into_iter().map(|(id, _)| id).collect();
        inside.sort_unstable();
        assert_eq!(inside, vec![A, B]);
    }

    #[test]
    fn nearest_vertex_snaps() {
        let g = triangle();
        assert_eq!(g.nearest_vertex(Point::new(9.0, 0.5)), Some(C));
        assert_eq!(g.nearest_vertex(Point::new(4.0, 2.0)), Some(B));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use rt_core::{EdgeId, VertexId};

    use super::helpers::{A, B, C, triangle};
    use crate::{DijkstraRouter, GraphError, Router};

    #[test]
    fn prefers_shorter_two_hop_route() {
        let g = triangle();
        let route = DijkstraRouter.route(&g, A, C).unwrap();
        assert_eq!(route.vertices, vec![A, B, C]);
        assert_eq!(route.edges, vec![EdgeId(10), EdgeId(11)]);
        assert_eq!(route.total_length, 10.0);
    }

    #[test]
    fn same_vertex_is_trivial() {
        let g = triangle();
        let route = DijkstraRouter.route(&g, B, B).unwrap();
        assert!(route.is_trivial());
        assert_eq!(route.vertices, vec![B]);
    }

    #[test]
    fn unreachable_is_explicit_failure() {
        let g = triangle();
        let err = DijkstraRouter.route(&g, C, A).unwrap_err();
        assert!(matches!(err, GraphError::NoPath { from: C, to: A }));
    }

    #[test]
    fn unknown_vertex() {
        let g = triangle();
        let err = DijkstraRouter.route(&g, A, VertexId(99)).unwrap_err();
        assert!(matches!(err, GraphError::VertexNotFound(VertexId(99))));
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use rt_core::VertexId;

    use super::helpers::{A, B, C, triangle};
    use crate::{GraphError, Path};

    #[test]
    fn prefix_lengths() {
        let g = triangle();
        let p = Path::from_vertices(&g, vec![A, B, C]).unwrap();
        assert_eq!(p.lengths(), &[5.0, 5.0]);
        assert_eq!(p.prefix_lengths(), &[5.0, 10.0]);
        assert_eq!(p.total_length(), 10.0);
        assert_eq!(p.segment_count(), 2);
        assert_eq!(p.origin(), A);
        assert_eq!(p.destination(), C);
    }

    #[test]
    fn rejects_short_repeating_or_broken() {
        let g = triangle();
        assert!(matches!(Path::from_vertices(&g, vec![A]), Err(GraphError::InvalidPath(_))));
        assert!(matches!(
            Path::from_vertices(&g, vec![A, B, A]),
            Err(GraphError::InvalidPath(_))
        ));
        assert!(matches!(
            Path::from_vertices(&g, vec![C, VertexId(1)]),
            Err(GraphError::EdgeBetweenNotFound { .. })
        ));
    }

    #[test]
    fn edge_index_resolution() {
        let g = triangle();
        let p = Path::from_vertices(&g, vec![A, B, C]).unwrap();
        assert_eq!(p.edge_index_at(0.0), Some((0, 0.0)));
        assert_eq!(p.edge_index_at(4.5), Some((0, 4.5)));
        // Exactly on a boundary belongs to the next segment.
        assert_eq!(p.edge_index_at(5.0), Some((1, 0.0)));
        assert_eq!(p.edge_index_at(7.0), Some((1, 2.0)));
        assert_eq!(p.edge_index_at(10.0), None);
        assert_eq!(p.edge_index_at(12.0), None);
    }
}

// ── Path generation ───────────────────────────────────────────────────────────

#[cfg(test)]
mod generator {
    use rt_core::{SimRng, VertexId};

    use super::helpers::{A, B, edge, triangle};
    use crate::{GraphError, GraphResult, PathGenerator, RoadGraph, Route, Router};

    #[test]
    fn generated_paths_are_valid() {
        let g = triangle();
        let generator = PathGenerator::new(&g, 1_000);
        let mut rng = SimRng::new(3);
        for _ in 0..50 {
            let p = generator.generate(&mut rng).unwrap();
            assert!(p.vertices().len() >= 2);
            assert_ne!(p.origin(), p.destination());
            for pair in p.vertices().windows(2) {
                assert!(g.edge_between(pair[0], pair[1]).is_ok());
            }
        }
    }

    #[test]
    fn too_few_candidates_fails_immediately() {
        let mut g = RoadGraph::new();
        g.add_vertex(A, None);
        g.add_vertex(B, None);
        let generator = PathGenerator::new(&g, 1_000);
        let err = generator.generate(&mut SimRng::new(1)).unwrap_err();
        assert!(matches!(err, GraphError::PathGenerationExhausted { attempts: 0 }));

        // A self-loop only yields one candidate.
        g.add_edge(edge(1, A, A, 1.0)).unwrap();
        let generator = PathGenerator::new(&g, 1_000);
        assert!(generator.generate(&mut SimRng::new(1)).is_err());
    }

    struct NeverRoutes;

    impl Router for NeverRoutes {
        fn route(&self, _: &RoadGraph, from: VertexId, to: VertexId) -> GraphResult<Route> {
            Err(GraphError::NoPath { from, to })
        }
    }

    #[test]
    fn retries_are_bounded() {
        let g = triangle();
        let generator = PathGenerator::with_router(&g, NeverRoutes, 5);
        let err = generator.generate(&mut SimRng::new(1)).unwrap_err();
        assert!(matches!(err, GraphError::PathGenerationExhausted { attempts: 5 }));
    }
}

// ── Occupancy store ───────────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy {
    use std::sync::Arc;

    use rt_core::VehicleId;

    use crate::{OccupancyStore, Occupant};

    fn occupant(name: &str, distance: f64) -> Arc<Occupant> {
        let o = Arc::new(Occupant::new(VehicleId::from(name), 1.0));
        o.set_distance(distance);
        o
    }

    #[test]
    fn ordered_front_to_back() {
        let store = OccupancyStore::new();
        let back = occupant("back", 1.0);
        let mid = occupant("mid", 2.0);
        let front = occupant("front", 3.0);
        store.push(&back);
        store.push(&front);
        store.push(&mid);

        assert_eq!(store.len(), 3);
        assert!(store.is_ordered());
        assert_eq!(store.index_of(&front), Some(0));
        assert_eq!(store.index_of(&back), Some(2));
    }

    #[test]
    fn vehicle_ahead() {
        let store = OccupancyStore::new();
        let back = occupant("back", 1.0);
        let front = occupant("front", 3.0);
        store.push(&back);
        store.push(&front);

        let ahead = store.vehicle_ahead(&back).unwrap();
        assert!(Arc::ptr_eq(&ahead, &front));
        assert!(store.vehicle_ahead(&front).is_none());

        let stranger = occupant("stranger", 2.0);
        assert!(store.vehicle_ahead(&stranger).is_none());
        assert_eq!(store.index_of(&stranger), None);
    }

    #[test]
    fn push_is_idempotent_and_remove_works() {
        let store = OccupancyStore::new();
        let a = occupant("a", 1.0);
        assert!(store.push(&a));
        assert!(!store.push(&a));
        assert_eq!(store.len(), 1);
        assert!(store.remove(&a));
        assert!(!store.remove(&a));
        assert!(store.is_empty());
    }

    #[test]
    fn resort_after_overtake() {
        let store = OccupancyStore::new();
        let a = occupant("a", 1.0);
        let b = occupant("b", 2.0);
        store.push(&a);
        store.push(&b);
        a.set_distance(5.0);
        store.resort();
        assert_eq!(store.index_of(&a), Some(0));
        assert!(store.is_ordered());
    }

    #[test]
    fn concurrent_mutation_keeps_membership_and_order() {
        let store = OccupancyStore::new();
        let occupants: Vec<_> = (0..16).map(|i| occupant(&format!("v{i}"), 0.0)).collect();

        std::thread::scope(|s| {
            for (i, o) in occupants.iter().enumerate() {
                let store = &store;
                s.spawn(move || {
                    store.push(o);
                    for step in 1..=50 {
                        o.set_distance((step * (i + 1)) as f64);
                        store.resort();
                    }
                });
            }
        });

        assert_eq!(store.len(), 16);
        store.resort();
        assert!(store.is_ordered());
        assert_eq!(store.index_of(&occupants[15]), Some(0));
    }
}

// ── Graph sources ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod source {
    use std::io::Cursor;
    use std::io::Write;

    use rt_core::{Point, SimRng, VertexId};

    use crate::source::{load_edges_reader, load_vertices_reader, parse_max_speed};
    use crate::{
        CsvSource, EdgeRecord, GraphError, GraphResult, GraphSource, MemorySource,
        VertexRecord, build_graph,
    };

    #[test]
    fn vertices_csv_with_missing_coordinates() {
        let csv = "id,x,y\n0,0.0,0.0\n1,,\nbad,1,1\n2,3.5,4.0\n";
        let v = load_vertices_reader(Cursor::new(csv)).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].pos, Some(Point::new(0.0, 0.0)));
        assert_eq!(v[1].pos, None);
        assert_eq!(v[2].id, VertexId(2));
    }

    #[test]
    fn edges_csv_max_speed_text() {
        let csv = "from,to,length,max_speed\n0,1,10.0,13.9\n1,0,10.0,\n1,2,5.0,fast\n2,x,1.0,3\n";
        let e = load_edges_reader(Cursor::new(csv)).unwrap();
        assert_eq!(e.len(), 3);
        assert_eq!(e[0].max_speed, 13.9);
        assert_eq!(e[1].max_speed, 0.0);
        assert_eq!(e[2].max_speed, 0.0);
    }

    #[test]
    fn max_speed_parsing() {
        assert_eq!(parse_max_speed(None), 0.0);
        assert_eq!(parse_max_speed(Some("  ")), 0.0);
        assert_eq!(parse_max_speed(Some(" 30 ")), 30.0);
        assert_eq!(parse_max_speed(Some("-4")), 0.0);
    }

    #[test]
    fn csv_source_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut vf = std::fs::File::create(dir.path().join("vertices.csv")).unwrap();
        writeln!(vf, "id,x,y\n0,0,0\n1,10,0\n2,10,10").unwrap();
        let mut ef = std::fs::File::create(dir.path().join("edges.csv")).unwrap();
        writeln!(ef, "from,to,length,max_speed\n0,1,10,\n1,2,10,8\n2,9,3,").unwrap();

        let src = CsvSource::from_dir(dir.path());
        let g = build_graph(&src, &mut SimRng::new(1)).unwrap();
        assert_eq!(g.vertex_count(), 3);
        // 2→9 has an unknown endpoint and is skipped.
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge_between(VertexId(1), VertexId(2)).unwrap().speed_limit(), Some(8.0));
    }

    #[test]
    fn missing_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let src = CsvSource::from_dir(dir.path());
        assert!(matches!(build_graph(&src, &mut SimRng::new(1)), Err(GraphError::Io(_))));
    }

    #[test]
    fn build_graph_skips_bad_records() {
        let v = |id, x| VertexRecord { id: VertexId(id), pos: Some(Point::new(x, 0.0)) };
        let e = |from, to, length| EdgeRecord {
            from: VertexId(from),
            to: VertexId(to),
            length,
            max_speed: 0.0,
        };
        let src = MemorySource::new(
            vec![v(0, 0.0), v(1, 1.0), v(1, 5.0), v(2, 2.0)],
            vec![e(0, 1, 1.0), e(0, 1, 2.0), e(1, 2, -1.0), e(1, 2, 1.0)],
        );
        let g = build_graph(&src, &mut SimRng::new(1)).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edge_between(VertexId(0), VertexId(1)).unwrap().length(), 1.0);
    }

    struct Failing;

    impl GraphSource for Failing {
        fn fetch_vertices(&self) -> GraphResult<Vec<VertexRecord>> {
            Err(GraphError::Source("database unreachable".into()))
        }
        fn fetch_edges(&self) -> GraphResult<Vec<EdgeRecord>> {
            Ok(vec![])
        }
    }

    #[test]
    fn fetch_failure_aborts() {
        let err = build_graph(&Failing, &mut SimRng::new(1)).unwrap_err();
        assert!(matches!(err, GraphError::Source(_)));
    }
}
