use tensor_space::{
    space::{ Space, oscillator, qubit },
    sparse::SpMat,
};

// two qubits coupled through a three-level cavity
//
//   q0 ──⊗── cav ──⊗── q1
//
// build the joint space, entangle the qubits, then trace the cavity and one
// qubit back out and watch the reduced state of the survivor
fn main() -> anyhow::Result<()> {
    let space = Space::compose([
        Space::from(qubit("q0")),
        Space::from(oscillator("cav", 3)?),
        Space::from(qubit("q1")),
    ]);
    println!("{}", space);

    // (∣0, 0, 0⟩ + ∣1, 0, 1⟩) / √2
    let psi =
        (&space.ket(&[0, 0, 0])? + &space.ket(&[1, 0, 1])?)
        * std::f64::consts::FRAC_1_SQRT_2;
    let rho: SpMat = psi.outer(&psi);
    println!("trace of the joint state: {}", rho.trace());

    // drop the cavity, then the first qubit
    let (space, rho) = space.ptrace_op(1, &rho)?;
    println!("{}", space);
    let (space, rho) = space.ptrace_op(0, &rho)?;
    println!("{}", space);

    // the surviving qubit is maximally mixed
    println!("reduced state: {}", rho);
    println!("trace of the reduced state: {}", rho.trace());
    Ok(())
}
