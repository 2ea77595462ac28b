//! Property tests for point maps and per-object coloring.

use std::sync::Arc;

use objectvis::*;
use proptest::prelude::*;

fn fibers(lengths: &[f64], classes: &[i64]) -> Arc<ObjectsData> {
    let rows = lengths
        .iter()
        .zip(classes)
        .enumerate()
        .map(|(i, (&len, &class))| {
            let y = i as f64 * 2.0;
            vec![0.0, y, 0.0, len, y, 0.0, 0.5, class as f64]
        })
        .collect();
    let mapping = ColumnMapping::new()
        .with(ColumnId::StartX, 0)
        .with(ColumnId::StartY, 1)
        .with(ColumnId::StartZ, 2)
        .with(ColumnId::EndX, 3)
        .with(ColumnId::EndY, 4)
        .with(ColumnId::EndZ, 5)
        .with(ColumnId::Diameter, 6);
    let table = ObjectTable::from_rows(rows).expect("valid table");
    Arc::new(ObjectsData::new(ObjectType::Fibers, table, Arc::new(mapping)).expect("valid mapping"))
}

/// Object lengths, class ids and a strictly ascending selection over them.
fn dataset() -> impl Strategy<Value = (Vec<f64>, Vec<i64>, Vec<usize>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(1.0f64..20.0, n),
            prop::collection::vec(0i64..3, n),
            prop::sample::subsequence((0..n).collect::<Vec<_>>(), 0..=n),
        )
    })
}

fn poly_vis_type() -> impl Strategy<Value = ObjectVisType> {
    prop_oneof![Just(ObjectVisType::Line), Just(ObjectVisType::Cylinder)]
}

fn assert_partition(vis: &ColoredPolyObjectVis) -> std::result::Result<(), TestCaseError> {
    let mut next = 0;
    for obj in 0..vis.object_count() {
        let range = vis.final_point_range(obj).expect("object exists");
        prop_assert_eq!(range.start, next);
        next = range.end();
    }
    prop_assert_eq!(next, vis.final_all_point_count());
    prop_assert_eq!(next, vis.colors().len());

    let logical: usize = (0..vis.object_count())
        .map(|obj| vis.object_point_count(obj))
        .sum();
    prop_assert_eq!(logical, vis.all_point_count());
    Ok(())
}

fn assert_uniform(vis: &ColoredPolyObjectVis) -> std::result::Result<(), TestCaseError> {
    for obj in 0..vis.object_count() {
        let range = vis.final_point_range(obj).expect("object exists");
        let first = vis.colors()[range.start];
        prop_assert!(vis.colors()[range.indices()].iter().all(|&c| c == first));
    }
    Ok(())
}

proptest! {
    #[test]
    fn selection_alphas_follow_selection(
        (lengths, classes, selection) in dataset(),
        vis_type in poly_vis_type(),
    ) {
        let color = Rgba::rgb(10, 20, 30);
        let mut vis = ObjectVis::create(
            fibers(&lengths, &classes),
            vis_type,
            color,
            &VisOptions::default(),
        )
        .expect("geometry columns mapped");
        let poly = vis.as_poly_mut().expect("point based");
        poly.set_selection(&selection, true).expect("sorted selection");

        assert_partition(poly)?;
        assert_uniform(poly)?;
        for obj in 0..poly.object_count() {
            let expected = if selection.contains(&obj) {
                DEFAULT_SELECTION_OPACITY
            } else {
                DEFAULT_CONTEXT_OPACITY
            };
            prop_assert_eq!(poly.object_color(obj), Some(color.with_alpha(expected)));
        }
    }

    #[test]
    fn context_diameter_keeps_point_map_consistent(
        (lengths, classes, selection) in dataset(),
        factor in 0.1f64..3.0,
    ) {
        let mut vis = ColoredPolyObjectVis::cylinder(
            fibers(&lengths, &classes),
            Rgba::WHITE,
            &VisOptions::default(),
        )
        .expect("diameter mapped");
        vis.set_context_diameter_factor(factor).expect("cylinders");
        vis.set_selection(&selection, true).expect("sorted selection");

        assert_partition(&vis)?;
        assert_uniform(&vis)?;
    }

    #[test]
    fn multi_class_colors_every_object_by_class(
        (lengths, classes, _selection) in dataset(),
    ) {
        let class_colors = [
            Rgba::rgb(255, 0, 0),
            Rgba::rgb(0, 255, 0),
            Rgba::rgb(0, 0, 255),
        ];
        let mut vis = ColoredPolyObjectVis::line(
            fibers(&lengths, &classes),
            Rgba::WHITE,
            &VisOptions::default(),
        )
        .expect("endpoints mapped");
        vis.multi_class_rendering(&class_colors, &[], 1.0)
            .expect("class ids within colors");

        assert_uniform(&vis)?;
        for (obj, &class) in classes.iter().enumerate() {
            prop_assert_eq!(vis.object_color(obj), Some(class_colors[class as usize]));
        }
        prop_assert!(vis.take_dirty().colors);
    }

    #[test]
    fn recoloring_twice_gives_identical_bytes(
        (lengths, classes, selection) in dataset(),
        vis_type in poly_vis_type(),
        use_lut in any::<bool>(),
        selection_alpha in any::<u8>(),
        context_alpha in any::<u8>(),
    ) {
        let mut vis = ObjectVis::create(
            fibers(&lengths, &classes),
            vis_type,
            Rgba::rgb(200, 100, 50),
            &VisOptions::default(),
        )
        .expect("geometry columns mapped");
        let poly = vis.as_poly_mut().expect("point based");
        if use_lut {
            let lut = LookupTable::new(
                [0.0, 20.0],
                vec![Rgba::rgb(0, 0, 255), Rgba::rgb(0, 255, 0), Rgba::rgb(255, 0, 0)],
            );
            // end x holds the fiber length
            poly.set_lookup_table(Arc::new(lut), 3).expect("column exists");
        }
        poly.set_selection_opacity(selection_alpha);
        poly.set_context_opacity(context_alpha);
        poly.set_selection(&selection, !selection.is_empty()).expect("sorted selection");

        poly.update_color_selection_rendering();
        let first = poly.color_bytes().to_vec();
        poly.update_color_selection_rendering();
        prop_assert_eq!(poly.color_bytes(), &first[..]);
        assert_uniform(poly)?;
    }

    #[test]
    fn unsorted_selection_is_rejected(
        (lengths, classes, selection) in dataset(),
    ) {
        prop_assume!(selection.len() >= 2);
        let mut vis = ColoredPolyObjectVis::line(
            fibers(&lengths, &classes),
            Rgba::WHITE,
            &VisOptions::default(),
        )
        .expect("endpoints mapped");
        let before = vis.colors().to_vec();
        let mut reversed = selection.clone();
        reversed.reverse();

        let rejected = matches!(
            vis.set_selection(&reversed, true),
            Err(ObjectVisError::UnsortedSelection { .. })
        );
        prop_assert!(rejected);
        prop_assert_eq!(vis.colors(), &before[..]);
        prop_assert!(vis.selection().is_empty());
    }
}
