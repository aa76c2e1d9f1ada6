//! Randomized checks of the algebraic laws the engine must obey

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;
use rand::prelude::*;
use rational_matrix::determinant::{determinant, inverse_by_adjoint};
use rational_matrix::ops::{multiply, transpose};
use rational_matrix::reduction::{inverse_by_row_reduction, rank};
use rational_matrix::solve::solve_by_row_reduction;
use rational_matrix::{Matrix, MatrixError, Rational, RowOperation, Solution, StepTrace};

const CASES: usize = 200;

fn rng() -> StdRng {
    let _ = env_logger::builder().is_test(true).try_init();
    StdRng::seed_from_u64(0x5eed)
}

fn random_rational(rng: &mut StdRng) -> Rational {
    let n = rng.gen_range(-9i64..=9);
    let d = if rng.gen_bool(0.3) { rng.gen_range(1i64..=6) } else { 1 };
    Rational::new(n, d).unwrap()
}

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    let mut data: Vec<Vec<Rational>> = (0..rows)
        .map(|_| (0..cols).map(|_| random_rational(rng)).collect())
        .collect();
    // Make some matrices rank-deficient
    if rows > 1 && rng.gen_bool(0.25) {
        let k = random_rational(rng);
        data[rows - 1] = data[0].iter().map(|v| &k * v).collect();
    }
    Matrix::new(data).unwrap()
}

fn random_non_zero(rng: &mut StdRng) -> Rational {
    loop {
        let value = random_rational(rng);
        if !value.is_zero() {
            return value;
        }
    }
}

fn random_row_operation(rng: &mut StdRng, rows: usize) -> RowOperation {
    let mut row = || rng.gen_range(1..=rows);
    let (first, second, target) = (row(), row(), row());
    match rng.gen_range(0..4) {
        0 => RowOperation::Swap { first, second },
        1 => RowOperation::Scale {
            row: target,
            scalar: random_non_zero(rng),
        },
        2 if first != target => RowOperation::AddScaled {
            target,
            source: first,
            scalar: random_rational(rng),
        },
        // A rank-preserving combination: the target keeps a non-zero weight
        _ if first != target => RowOperation::Combine {
            target,
            first: target,
            first_scalar: random_non_zero(rng),
            second: first,
            second_scalar: random_rational(rng),
        },
        _ => RowOperation::Swap { first, second },
    }
}

#[test]
fn normalized_fractions_are_canonical() {
    let mut rng = rng();
    for _ in 0..CASES {
        let n: i64 = rng.gen_range(-1_000_000..=1_000_000);
        let mut d: i64 = rng.gen_range(-1_000_000..=1_000_000);
        if d == 0 {
            d = 1;
        }
        let r = Rational::normalize(BigInt::from(n), BigInt::from(d)).unwrap();
        assert!(r.denom().is_positive());
        assert_eq!(r.numer().abs().gcd(r.denom()), BigInt::from(1));
        if n == 0 {
            assert_eq!(r.denom(), &BigInt::from(1));
        }
    }
}

#[test]
fn division_then_multiplication_round_trips() {
    let mut rng = rng();
    for _ in 0..CASES {
        let a = random_rational(&mut rng);
        let b = random_non_zero(&mut rng);
        assert_eq!(&a.checked_div(&b).unwrap() * &b, a);
    }
    assert_eq!(
        Rational::one().checked_div(&Rational::zero()),
        Err(MatrixError::DivisionByZero)
    );
}

#[test]
fn transpose_is_an_involution() {
    let mut rng = rng();
    for _ in 0..CASES {
        let (r, c) = (rng.gen_range(1..=5), rng.gen_range(1..=5));
        let a = random_matrix(&mut rng, r, c);
        let mut trace = StepTrace::new();
        assert_eq!(transpose(&transpose(&a, &mut trace), &mut trace), a);
    }
}

#[test]
fn inverse_times_matrix_is_identity() {
    let mut rng = rng();
    let mut checked = 0;
    for _ in 0..CASES {
        let n = rng.gen_range(1..=4);
        let a = random_matrix(&mut rng, n, n);
        let mut trace = StepTrace::new();
        if determinant(&a, &mut trace).unwrap().is_zero() {
            continue;
        }
        let inverse = inverse_by_adjoint(&a, &mut trace).unwrap();
        assert_eq!(multiply(&a, &inverse, &mut trace).unwrap(), Matrix::identity(n));
        checked += 1;
    }
    assert!(checked > CASES / 4);
}

#[test]
fn both_inverse_methods_agree() {
    let mut rng = rng();
    for _ in 0..CASES {
        let n = rng.gen_range(1..=4);
        let a = random_matrix(&mut rng, n, n);
        let by_adjoint = inverse_by_adjoint(&a, &mut StepTrace::new());
        let by_reduction = inverse_by_row_reduction(&a, &mut StepTrace::new());
        match (by_adjoint, by_reduction) {
            (Ok(x), Ok(y)) => assert_eq!(x, y),
            (Err(MatrixError::SingularMatrix { .. }), Err(MatrixError::SingularMatrix { .. })) => {}
            (x, y) => panic!("inverse methods disagree on {:?}: {:?} vs {:?}", a, x, y),
        }
    }
}

#[test]
fn rank_is_invariant_under_row_operations() {
    let mut rng = rng();
    for _ in 0..CASES / 2 {
        let (r, c) = (rng.gen_range(1..=4), rng.gen_range(1..=4));
        let mut a = random_matrix(&mut rng, r, c);
        let expected = rank(&a, &mut StepTrace::new()).unwrap();
        for _ in 0..6 {
            let op = random_row_operation(&mut rng, r);
            a = op.apply(&a, &mut StepTrace::new()).unwrap();
            assert_eq!(rank(&a, &mut StepTrace::new()).unwrap(), expected, "after {}", op);
        }
    }
}

#[test]
fn unique_solutions_satisfy_the_system() {
    let mut rng = rng();
    for _ in 0..CASES / 2 {
        let n = rng.gen_range(1..=4);
        let a = random_matrix(&mut rng, n, n);
        let b: Vec<Rational> = (0..n).map(|_| random_rational(&mut rng)).collect();
        let solution = solve_by_row_reduction(&a, &b, &mut StepTrace::new()).unwrap();
        let full_rank = rank(&a, &mut StepTrace::new()).unwrap() == n;
        assert_eq!(solution.is_unique(), full_rank);
        if let Solution::Unique { values } = solution {
            let x = Matrix::column(&values).unwrap();
            let product = multiply(&a, &x, &mut StepTrace::new()).unwrap();
            assert_eq!(product, Matrix::column(&b).unwrap());
        }
    }
}

#[test]
fn worked_scenarios() {
    let mut trace = StepTrace::new();
    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_integers(rows).unwrap()
    }
    fn v(values: &[i64]) -> Vec<Rational> {
        values.iter().map(|&x| Rational::from(x)).collect()
    }

    assert_eq!(determinant(&m(&[&[1, 2], &[3, 4]]), &mut trace).unwrap(), Rational::from(-2));

    let half = Rational::new(1, 2).unwrap();
    let expected = Matrix::new(vec![
        vec![half.clone(), Rational::zero()],
        vec![Rational::zero(), half],
    ])
    .unwrap();
    assert_eq!(inverse_by_adjoint(&m(&[&[2, 0], &[0, 2]]), &mut trace).unwrap(), expected);

    assert_eq!(
        solve_by_row_reduction(&m(&[&[1, 1], &[2, 2]]), &v(&[3, 6]), &mut trace).unwrap(),
        Solution::Infinite {
            rank: 1,
            free_variables: 1
        }
    );
    assert_eq!(
        solve_by_row_reduction(&m(&[&[1, 1], &[1, 1]]), &v(&[1, 2]), &mut trace).unwrap(),
        Solution::NoSolution {
            rank_a: 1,
            rank_augmented: 2
        }
    );
    assert_eq!(
        solve_by_row_reduction(&m(&[&[2, 1], &[1, 1]]), &v(&[5, 3]), &mut trace).unwrap(),
        Solution::Unique { values: v(&[2, 1]) }
    );

    assert_eq!(Rational::parse("2.5").unwrap(), Rational::new(5, 2).unwrap());
}
