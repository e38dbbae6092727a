//! Composition des numéros de maison
//!
//! Le registre éclate un numéro comme "12a-14b" en six champs (zahl1,
//! buchstabe1, verbindung1, zahl2, buchstabe2, bereich). On recompose ici la
//! forme affichable, pour l'adresse principale comme pour les sous-adresses
//! des bâtiments.

/// Marqueur utilisé par le registre pour un bereich absent
const KEINE_ANGABE: &str = "keine Angabe";

/// Connecteurs de sous-adresse qui se collent sans espace aux deux numéros
fn joins_tightly(connector: &str) -> bool {
    matches!(connector, "" | "-" | "/")
}

/// Recompose le numéro de maison principal depuis ses six composantes.
///
/// `zahl1` + `buchstabe1` forment le premier numéro, `zahl2` + `buchstabe2`
/// le second; `verbindung1` les relie sans espace ("-", "/", "bis", ...),
/// deux numéros sans connecteur sont séparés d'un espace. Le `bereich`
/// éventuel est accolé avec le séparateur historique " ,".
pub fn compose_hausnummer(
    zahl1: &str,
    buchstabe1: &str,
    verbindung1: &str,
    zahl2: &str,
    buchstabe2: &str,
    bereich: &str,
) -> String {
    let n1 = format!("{}{}", zahl1.trim(), buchstabe1.trim());
    let n2 = format!("{}{}", zahl2.trim(), buchstabe2.trim());
    let connector = verbindung1.trim();

    let mut nummer = if n2.is_empty() {
        n1
    } else if connector.is_empty() {
        format!("{} {}", n1, n2)
    } else {
        format!("{}{}{}", n1, connector, n2)
    };

    let bereich = bereich.trim();
    if !bereich.is_empty() && bereich != KEINE_ANGABE {
        nummer.push_str(" ,");
        nummer.push_str(bereich);
    }

    nummer
}

/// Recompose la sous-adresse d'un bâtiment (zahl3/4, buchstabe3/4).
///
/// `verbindung2` relie le numéro principal à la sous-adresse dans le modèle
/// du registre; la forme affichable ne l'utilise pas, seuls zahl3..buchstabe4
/// et `verbindung3` comptent.
pub fn compose_subadresse(
    zahl3: &str,
    buchstabe3: &str,
    _verbindung2: &str,
    zahl4: &str,
    buchstabe4: &str,
    verbindung3: &str,
) -> String {
    let n3 = format!("{}{}", zahl3.trim(), buchstabe3.trim());
    let n4 = format!("{}{}", zahl4.trim(), buchstabe4.trim());
    let connector = verbindung3.trim();

    if n4.is_empty() {
        n3
    } else if joins_tightly(connector) {
        format!("{}{}{}", n3, connector, n4)
    } else {
        format!("{} {} {}", n3, connector, n4)
    }
}
