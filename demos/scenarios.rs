use arith_expr::{Expression, Operand};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut expr = Expression::new();
    let one = expr.new_constant(1, 0)?;
    let pi = expr.new_constant(3.14, 2)?;
    expr.add_addition(one, pi)?;
    println!("{} = {:.2}", expr, expr.evaluate()?);

    let two = expr.new_constant(2, 1)?;
    expr.add_subtraction(Operand::Root, two)?;
    println!("{} = {:.2}", expr, expr.evaluate()?);

    let mut ratio = Expression::new();
    let x = ratio.new_variable("x", 0)?;
    let y = ratio.new_variable("y", 1)?;
    let z = ratio.new_variable("z", 2)?;
    ratio.add_multiplication(&x, &y)?;
    ratio.add_division(&z, Operand::Root)?;

    match ratio.evaluate() {
        Ok(value) => println!("{} = {:.2}", ratio, value),
        Err(e) => eprintln!("Unable to evaluate: {}", e),
    }

    x.set_value(1)?;
    y.set_value(2)?;
    z.set_value(10)?;
    println!("{} = {:.2}", ratio, ratio.evaluate()?);

    Ok(())
}
