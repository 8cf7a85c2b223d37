//! Print the project page's link cards as JSON.

use cyclic_eval::content::cards_json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", cards_json()?);
    Ok(())
}
