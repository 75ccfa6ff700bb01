use podnn_doe::{FullFactorial, Lhs, LhsKind, ParameterSpace, Random, SamplingMethod};

fn main() {
    // Shekel-like parameter box: 10 weights and 10 locations
    let mut mu_min = vec![0.1; 10];
    mu_min.extend(vec![0.; 10]);
    let mut mu_max = vec![1.; 10];
    mu_max.extend(vec![10.; 10]);
    let space = ParameterSpace::new(&mu_min, &mu_max).expect("valid parameter bounds");
    let n = 5;

    println!("Take {n} parameter samples in");
    println!("{}\n", space.bounds());

    println!("*** using random sampling");
    println!("{}\n", Random::new(&space).seed(42).sample(n));

    println!("*** using full-factorial sampling");
    println!("{}\n", FullFactorial::new(&space).sample(n));

    println!("*** using centered latin hypercube sampling");
    println!("{}\n", Lhs::new(&space).kind(LhsKind::Centered).sample(n));

    println!("*** using maximin latin hypercube sampling");
    println!("{}\n", Lhs::new(&space).kind(LhsKind::Maximin).seed(42).sample(n));
}
