//! LAPACK backed eigensolvers

use lapack::{dggev3, dstevr};
use lapack_src as _;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::ModeError;

/// The `num` smallest eigenpairs of the symmetric tridiagonal matrix with diagonal `diag` and
/// off-diagonal `off`. Only the requested eigenpairs are computed.
pub(crate) fn tridiagonal_smallest(
    diag: &[f64],
    off: &[f64],
    num: usize,
) -> Result<(Vec<f64>, DMatrix<f64>), ModeError> {
    let n = diag.len();
    let mut d = diag.to_vec();
    // dstevr wants n entries in e, the last one is workspace
    let mut e = off.to_vec();
    e.push(0.);

    let mut found = 0;
    let mut eigenvalues = vec![0.; n];
    let mut eigenvectors = DMatrix::from_element(n, num, 0.);
    let mut isuppz = vec![0; 2 * num.max(1)];
    let mut workspace = vec![0.; 1];
    let mut iworkspace = vec![0; 1];
    let mut info = 0;

    unsafe {
        dstevr(
            b'V',
            b'I',
            n as i32,
            &mut d,
            &mut e,
            0.,
            0.,
            1,
            num as i32,
            0.,
            &mut found,
            &mut eigenvalues,
            eigenvectors.as_mut_slice(),
            n as i32,
            &mut isuppz,
            &mut workspace,
            -1,
            &mut iworkspace,
            -1,
            &mut info,
        )
    }

    if info != 0 {
        return Err(ModeError::Convergence(format!(
            "dstevr workspace query failed with info = {info}"
        )));
    }

    let lwork = workspace[0] as i32;
    let liwork = iworkspace[0];
    let mut workspace = vec![0.; lwork as usize];
    let mut iworkspace = vec![0; liwork as usize];

    unsafe {
        dstevr(
            b'V',
            b'I',
            n as i32,
            &mut d,
            &mut e,
            0.,
            0.,
            1,
            num as i32,
            0.,
            &mut found,
            &mut eigenvalues,
            eigenvectors.as_mut_slice(),
            n as i32,
            &mut isuppz,
            &mut workspace,
            lwork,
            &mut iworkspace,
            liwork,
            &mut info,
        )
    }

    if info != 0 || found as usize != num {
        return Err(ModeError::Convergence(format!(
            "dstevr found {found} of {num} eigenpairs (info = {info})"
        )));
    }

    eigenvalues.truncate(num);

    Ok((eigenvalues, eigenvectors))
}

/// All finite eigenpairs of the real pencil `a x = lambda b x`
pub(crate) fn generalized(
    mut a: DMatrix<f64>,
    mut b: DMatrix<f64>,
) -> Result<(Vec<Complex64>, DMatrix<Complex64>), ModeError> {
    let n = a.nrows();
    let mut eigenval_real = vec![0.; n];
    let mut eigenval_imag = vec![0.; n];
    let mut eigenval_scale = vec![0.; n];
    let mut eigenvectors = DMatrix::from_element(n, n, 0.);
    let mut info = 0;
    let mut workspace = vec![0.; 1];

    unsafe {
        dggev3(
            b'N',
            b'V',
            n as i32,
            a.as_mut_slice(),
            n as i32,
            b.as_mut_slice(),
            n as i32,
            &mut eigenval_real,
            &mut eigenval_imag,
            &mut eigenval_scale,
            [].as_mut_slice(),
            1,
            eigenvectors.as_mut_slice(),
            n as i32,
            &mut workspace,
            -1,
            &mut info,
        )
    }

    if info != 0 {
        return Err(ModeError::Convergence(format!(
            "dggev3 workspace query failed with info = {info}"
        )));
    }

    let lwork = workspace[0] as i32;
    let mut workspace = vec![0.; lwork as usize];

    unsafe {
        dggev3(
            b'N',
            b'V',
            n as i32,
            a.as_mut_slice(),
            n as i32,
            b.as_mut_slice(),
            n as i32,
            &mut eigenval_real,
            &mut eigenval_imag,
            &mut eigenval_scale,
            [].as_mut_slice(),
            1,
            eigenvectors.as_mut_slice(),
            n as i32,
            &mut workspace,
            lwork,
            &mut info,
        )
    }

    if info != 0 {
        return Err(ModeError::Convergence(format!(
            "dggev3 failed with info = {info}"
        )));
    }

    let mut eigenvalues = Vec::with_capacity(n);
    let mut columns = Vec::with_capacity(n);
    let mut skip_next = false;

    for i in 0..n {
        if skip_next {
            skip_next = false;
            continue;
        }

        let real_part = eigenvectors.column(i).map(|x| Complex64::new(x, 0.));

        if eigenval_imag[i] != 0. {
            let imag_part = eigenvectors.column(i + 1).map(|x| Complex64::new(0., x));

            columns.push(&real_part + &imag_part);
            columns.push(&real_part - &imag_part);
            skip_next = true;
        } else {
            columns.push(real_part);
        }

        // Conjugate pairs share the same scale
        let pair = if skip_next { 2 } else { 1 };
        for p in 0..pair {
            eigenvalues.push(Complex64::new(
                eigenval_real[i + p] / eigenval_scale[i + p],
                eigenval_imag[i + p] / eigenval_scale[i + p],
            ));
        }
    }

    let finite: Vec<usize> = (0..n)
        .filter(|&i| eigenvalues[i].re.is_finite() && eigenvalues[i].im.is_finite())
        .collect();

    let vectors = DMatrix::from_fn(n, finite.len(), |r, c| columns[finite[c]][r]);
    let values = finite.iter().map(|&i| eigenvalues[i]).collect();

    Ok((values, vectors))
}
