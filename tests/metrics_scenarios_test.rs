use variant_insights::{
    AgreementMatrixBuilder, AssignmentMatrixBuilder, AssignmentMatrixOptions, CategoryAssignment,
    Collaborator, CollaboratorWeights, CoverageCalculator, JaccardAgreementCalculator,
    MetricsAggregator, PlotPoint, VariantBatch,
};

fn tag(plot_point_id: &str, category_id: &str, email: &str) -> CategoryAssignment {
    CategoryAssignment {
        plot_point_id: plot_point_id.to_string(),
        category_id: category_id.to_string(),
        collaborator_email: email.to_string(),
        category_name: String::new(),
    }
}

fn plot_point(id: &str, order: u32, assignments: Vec<CategoryAssignment>) -> PlotPoint {
    PlotPoint {
        id: id.to_string(),
        order,
        category: String::new(),
        assignments,
    }
}

fn scenario_a_points() -> Vec<PlotPoint> {
    vec![
        plot_point(
            "p1",
            1,
            vec![
                tag("p1", "cat-a", "alpha@example.com"),
                tag("p1", "cat-b", "beta@example.com"),
            ],
        ),
        plot_point(
            "p2",
            2,
            vec![
                tag("p2", "cat-a", "alpha@example.com"),
                tag("p2", "cat-c", "gamma@example.com"),
            ],
        ),
    ]
}

#[test]
fn test_scenario_a_weighted_assignment_matrix() {
    let weights = CollaboratorWeights::new([("alpha@example.com", 2.0)]).unwrap();
    let builder = AssignmentMatrixBuilder::new(
        AssignmentMatrixOptions::default()
            .with_category_order(["cat-a", "cat-b", "cat-c"])
            .with_weights(weights),
    );

    let result = builder.build(&scenario_a_points());

    assert_eq!(result.matrix, vec![vec![2.0, 1.0, 0.0], vec![2.0, 0.0, 1.0]]);
}

#[test]
fn test_scenario_b_row_normalization() {
    let points = vec![plot_point(
        "p1",
        1,
        vec![
            tag("p1", "cat-a", "alpha@example.com"),
            tag("p1", "cat-b", "alpha@example.com"),
        ],
    )];

    let result = AssignmentMatrixBuilder::new(
        AssignmentMatrixOptions::default().normalized_within_plot_point(true),
    )
    .build(&points);

    assert_eq!(result.matrix, vec![vec![0.5, 0.5]]);
}

#[test]
fn test_scenario_c_agreement_from_assignment_matrix() {
    let unweighted = AssignmentMatrixBuilder::new(
        AssignmentMatrixOptions::default().with_category_order(["cat-a", "cat-b", "cat-c"]),
    )
    .build(&scenario_a_points());

    let raw = AgreementMatrixBuilder::new(false).build(&unweighted).unwrap();
    assert_eq!(raw.matrix, vec![vec![2.0, 1.0], vec![1.0, 2.0]]);

    let weights = CollaboratorWeights::new([("alpha@example.com", 2.0)]).unwrap();
    let weighted = AssignmentMatrixBuilder::new(
        AssignmentMatrixOptions::default()
            .with_category_order(["cat-a", "cat-b", "cat-c"])
            .with_weights(weights),
    )
    .build(&scenario_a_points());

    for input in [&unweighted, &weighted] {
        let cosine = AgreementMatrixBuilder::new(true).build(input).unwrap();
        assert!((cosine.matrix[0][0] - 1.0).abs() < 1e-12);
        assert!((cosine.matrix[1][1] - 1.0).abs() < 1e-12);
        assert!(cosine.matrix[0][1] > 0.0 && cosine.matrix[0][1] < 1.0);
        assert_eq!(cosine.matrix[0][1], cosine.matrix[1][0]);
    }
}

#[test]
fn test_scenario_d_zero_collaborators() {
    let batch = VariantBatch::new(vec![plot_point("p1", 1, vec![])], vec![]).unwrap();

    let coverage = CoverageCalculator::new().calculate(&batch);
    let metrics = MetricsAggregator::new().aggregate(&batch);

    assert_eq!(coverage.completion_percentage, 0.0);
    assert_eq!(metrics.completion_percentage, 0.0);
    assert_eq!(metrics.total_capacity, 0);
    assert!(metrics.agreement_matrix.is_empty());
    assert!(metrics.highest_agreement_pair.is_none());
}

#[test]
fn test_scenario_e_disjoint_collaborators() {
    let batch = VariantBatch::new(
        vec![
            plot_point("p1", 1, vec![tag("p1", "cat-a", "alpha@example.com")]),
            plot_point("p2", 2, vec![tag("p2", "cat-b", "beta@example.com")]),
        ],
        vec![
            Collaborator::new("alpha@example.com"),
            Collaborator::new("beta@example.com"),
        ],
    )
    .unwrap();

    let report = JaccardAgreementCalculator::new().calculate(&batch);

    assert_eq!(report.matrix[0][1], 0.0);
    assert_eq!(report.matrix[1][0], 0.0);
    assert_eq!(report.matrix[0][0], 1.0);
    assert_eq!(report.matrix[1][1], 1.0);
    assert_eq!(report.average_agreement, 0.0);
}

#[test]
fn test_percentages_stay_in_bounds_for_larger_variant() {
    let emails = [
        "ana@example.com",
        "ben@example.com",
        "cai@example.com",
        "dee@example.com",
        "eli@example.com",
    ];
    let mut points = Vec::new();
    for i in 0..12u32 {
        let id = format!("p{}", i + 1);
        let assignments = emails
            .iter()
            .enumerate()
            .filter(|(k, _)| (i as usize + k) % 3 != 0)
            .map(|(k, email)| tag(&id, &format!("cat-{}", (i as usize * k) % 4), email))
            .collect();
        points.push(plot_point(&id, i + 1, assignments));
    }
    let roster = emails.iter().map(|e| Collaborator::new(*e)).collect();
    let batch = VariantBatch::new(points, roster).unwrap();

    let metrics = MetricsAggregator::new().aggregate(&batch);

    assert!((0.0..=100.0).contains(&metrics.completion_percentage));
    assert!((0.0..=100.0).contains(&metrics.average_agreement));
    for coverage in &metrics.collaborator_coverage {
        assert!((0.0..=100.0).contains(&coverage.percentage));
    }
    for (i, row) in metrics.agreement_matrix.iter().enumerate() {
        assert_eq!(row[i], 1.0);
        for (j, value) in row.iter().enumerate() {
            assert!((0.0..=1.0).contains(value));
            assert_eq!(*value, metrics.agreement_matrix[j][i]);
        }
    }
    let approx = metrics.average_assignments_per_plot_point * metrics.total_plot_points as f64;
    assert!(
        (approx - metrics.total_assignments as f64).abs()
            <= 0.05 * metrics.total_plot_points as f64 + 1e-9
    );

    let assignment = AssignmentMatrixBuilder::new(AssignmentMatrixOptions::default())
        .build(batch.plot_points());
    let cosine = AgreementMatrixBuilder::new(true).build(&assignment).unwrap();
    for (i, row) in cosine.matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            assert!((0.0..=1.0).contains(value));
            assert_eq!(*value, cosine.matrix[j][i]);
        }
    }
}

#[test]
fn test_repeated_runs_are_identical_and_inputs_untouched() {
    let points = scenario_a_points();
    let roster = vec![
        Collaborator::new("Gamma@Example.com"),
        Collaborator::new("alpha@example.com"),
        Collaborator::new("beta@example.com"),
    ];
    let points_before = points.clone();
    let roster_before = roster.clone();

    let first = MetricsAggregator::new()
        .aggregate(&VariantBatch::new(points.clone(), roster.clone()).unwrap());
    let second = MetricsAggregator::new()
        .aggregate(&VariantBatch::new(points.clone(), roster.clone()).unwrap());

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(points, points_before);
    assert_eq!(roster, roster_before);
}
