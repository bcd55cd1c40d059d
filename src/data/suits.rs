use super::SuitLink;

/// Patent-related lawsuits in the mobile communications industry, circa
/// 2011.
const SUITS: [(&str, &str, &str); 28] = [
    ("Microsoft", "Amazon", "licensing"),
    ("Microsoft", "HTC", "licensing"),
    ("Samsung", "Apple", "suit"),
    ("Motorola", "Apple", "suit"),
    ("Nokia", "Apple", "resolved"),
    ("HTC", "Apple", "suit"),
    ("Kodak", "Apple", "suit"),
    ("Microsoft", "Barnes & Noble", "suit"),
    ("Microsoft", "Foxconn", "suit"),
    ("Oracle", "Google", "suit"),
    ("Apple", "HTC", "suit"),
    ("Microsoft", "Inventec", "suit"),
    ("Samsung", "Kodak", "resolved"),
    ("LG", "Kodak", "resolved"),
    ("RIM", "Kodak", "suit"),
    ("Sony", "LG", "suit"),
    ("Kodak", "LG", "resolved"),
    ("Apple", "Nokia", "resolved"),
    ("Qualcomm", "Nokia", "resolved"),
    ("Apple", "Motorola", "suit"),
    ("Microsoft", "Motorola", "suit"),
    ("Motorola", "Microsoft", "suit"),
    ("Huawei", "ZTE", "suit"),
    ("Ericsson", "ZTE", "suit"),
    ("Kodak", "Samsung", "resolved"),
    ("Apple", "Samsung", "suit"),
    ("Kodak", "RIM", "suit"),
    ("Nokia", "Qualcomm", "suit"),
];

/// The bundled patent-suit graph, used when no suits file is supplied.
pub fn builtin_suits() -> Vec<SuitLink> {
    SUITS
        .iter()
        .map(|&(source, target, kind)| SuitLink {
            source: source.to_owned(),
            target: target.to_owned(),
            kind: kind.to_owned(),
        })
        .collect()
}
